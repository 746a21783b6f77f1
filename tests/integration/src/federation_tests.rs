//! End-to-end tests for a resolver federating directory and archive
//! repositories, configured the way a host application would: from a
//! persisted settings file.

use std::io::Read;
use std::path::Path;

use esm_resolver::{ModuleHandle, ModuleResolver, RepositorySettings};
use esm_test_utils::{ArchiveBuilder, ModuleTree};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use url::Url;

struct Federation {
    _system_dir: TempDir,
    user: ModuleTree,
    settings_dir: TempDir,
}

impl Federation {
    /// A system archive with versioned API modules and a user directory
    /// that shadows one of them.
    fn new() -> Self {
        let (system_dir, jar) = ArchiveBuilder::new()
            .dir("js/")
            .dir("js/v3/")
            .file("js/v3/api/layers.js", "export const layers = 'system';")
            .file("js/v3/api/util.mjs", "import './layers.js';")
            .file("js/v2/api/layers.js", "export const layers = 'v2';")
            .build_temp("system.jar");
        let user = ModuleTree::new()
            .file("scripts/main.mjs", "import { layers } from '../api/layers.js';")
            .file("scripts/helpers/format.js", "export const format = 1;")
            .file("api/layers.js", "export const layers = 'user';");

        let settings_dir = TempDir::new().unwrap();
        let settings = RepositorySettings {
            system: Some(format!("archive:{}!/js/v3", file_url(&jar))),
            repositories: vec![dir_url(user.root())],
        };
        settings
            .save(&settings_dir.path().join("repositories.toml"))
            .unwrap();

        Self {
            _system_dir: system_dir,
            user,
            settings_dir,
        }
    }

    fn resolver(&self) -> ModuleResolver {
        let settings =
            RepositorySettings::load(&self.settings_dir.path().join("repositories.toml")).unwrap();
        let (resolver, report) = ModuleResolver::from_settings(&settings);
        assert!(report.is_complete(), "skipped: {:?}", report.skipped);
        resolver
    }
}

fn file_url(path: &Path) -> Url {
    Url::from_file_path(path.canonicalize().unwrap()).unwrap()
}

fn dir_url(path: &Path) -> String {
    Url::from_directory_path(path.canonicalize().unwrap())
        .unwrap()
        .to_string()
}

fn source(resolver: &ModuleResolver, handle: &ModuleHandle) -> String {
    let mut text = String::new();
    resolver
        .open(handle)
        .unwrap()
        .read_to_string(&mut text)
        .unwrap();
    text
}

#[test]
fn system_repository_wins_over_user_repositories() {
    let federation = Federation::new();
    let resolver = federation.resolver();

    let layers = resolver.resolve("api/layers").unwrap();
    assert_eq!(source(&resolver, &layers), "export const layers = 'system';");
}

#[test]
fn nested_import_resolves_inside_referrer_repository() {
    let federation = Federation::new();
    let resolver = federation.resolver();

    // Inside the user repository "../api/layers.js" is the user copy,
    // even though the system archive has the same path
    let main = resolver.resolve("scripts/main").unwrap();
    let layers = resolver.resolve_from(&main, "../api/layers.js").unwrap();
    assert_eq!(source(&resolver, &layers), "export const layers = 'user';");

    let format = resolver.resolve_from(&main, "./helpers/format").unwrap();
    assert_eq!(source(&resolver, &format), "export const format = 1;");

    // Inside the archive, the nested import stays below js/v3
    let util = resolver.resolve("api/util").unwrap();
    let system_layers = resolver.resolve_from(&util, "./layers.js").unwrap();
    assert_eq!(source(&resolver, &system_layers), "export const layers = 'system';");
    assert!(resolver.resolve_from(&util, "../../v2/api/layers").is_none());
}

#[test]
fn handles_round_trip_as_text() {
    let federation = Federation::new();
    let resolver = federation.resolver();

    let handle = resolver.resolve("scripts/main").unwrap();
    let text = handle.to_string();
    let parsed: ModuleHandle = text.parse().unwrap();

    assert_eq!(parsed, handle);
    assert_eq!(resolver.resolve(&text), Some(handle.clone()));
    assert_eq!(
        source(&resolver, &parsed),
        "import { layers } from '../api/layers.js';"
    );
}

#[test]
fn handles_do_not_survive_a_reload() {
    let federation = Federation::new();
    let resolver = federation.resolver();
    let before = resolver.resolve("scripts/main").unwrap();

    // Reloading builds fresh repositories with fresh identities
    let settings = resolver.to_settings();
    let report = resolver.load_settings(&settings);
    assert!(report.is_complete());

    assert!(resolver.resolve(&before.to_string()).is_none());
    assert!(resolver.open(&before).is_err());
    let after = resolver.resolve("scripts/main").unwrap();
    assert_ne!(after, before);
}

#[test]
fn settings_survive_a_save_and_reload() {
    let federation = Federation::new();
    let resolver = federation.resolver();

    let path = federation.settings_dir.path().join("copy.json");
    resolver.to_settings().save(&path).unwrap();
    let reloaded = RepositorySettings::load(&path).unwrap();

    assert_eq!(reloaded, resolver.to_settings());
    assert_eq!(reloaded.repositories, vec![dir_url(federation.user.root())]);
}
