//! Property tests over arbitrary module references.
//!
//! Whatever a script passes in, a reference either doesn't resolve or it
//! resolves to a module inside the repository that can be opened.

use std::io::Read;
use std::sync::Arc;

use esm_fs::RelativePath;
use esm_repo::{ArchiveRepository, DirectoryRepository, ModuleRepository};
use esm_test_utils::{ArchiveBuilder, ModuleTree};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(".".to_string()),
        Just("..".to_string()),
        Just("lib".to_string()),
        Just("util".to_string()),
        Just("x".to_string()),
        Just("x.js".to_string()),
        Just("secret".to_string()),
        Just("repo".to_string()),
    ]
}

fn reference() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(segment(), 0..7),
        prop::bool::ANY,
        prop::bool::ANY,
    )
        .prop_map(|(segments, leading_slash, backslashes)| {
            let separator = if backslashes { "\\" } else { "/" };
            let joined = segments.join(separator);
            if leading_slash { format!("/{joined}") } else { joined }
        })
}

/// `outer/secret.mjs` sits next to the repository root `outer/repo`.
fn directory_fixture() -> (ModuleTree, Arc<dyn ModuleRepository>) {
    let tree = ModuleTree::new()
        .file("secret.mjs", "outside")
        .file("x.js", "outside")
        .file("repo/x.js", "x")
        .file("repo/lib/x.mjs", "lib x")
        .file("repo/lib/util/x", "bare");
    let repo = Arc::new(DirectoryRepository::new(tree.path("repo")).unwrap());
    (tree, repo)
}

fn check_resolution(repo: &dyn ModuleRepository, reference: &str) -> Result<(), TestCaseError> {
    let Some(resolved) = repo.resolve_module_str(reference) else {
        return Ok(());
    };
    prop_assert!(repo.matches_prefix(&resolved));
    prop_assert!(resolved.len() > 2);

    let relative = resolved.strip_prefix(repo.unique_prefix()).unwrap();
    prop_assert_eq!(relative.canonicalize_within(), Some(relative.clone()));

    let mut content = String::new();
    repo.open_for_read(&resolved)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    prop_assert_ne!(content.as_str(), "outside");

    // Resolving the result again is stable
    prop_assert_eq!(repo.resolve_module_path(&resolved), Some(resolved.clone()));
    Ok(())
}

proptest! {
    #[test]
    fn directory_resolution_stays_inside_root(reference in reference()) {
        let (_tree, repo) = directory_fixture();
        check_resolution(repo.as_ref(), &reference)?;
    }

    #[test]
    fn archive_resolution_stays_inside_root(reference in reference()) {
        let (_dir, jar) = ArchiveBuilder::new()
            .file("secret.mjs", "outside")
            .file("x.js", "outside")
            .file("repo/x.js", "x")
            .file("repo/lib/x.mjs", "lib x")
            .file("repo/lib/util/x", "bare")
            .build_temp("modules.zip");
        let repo = ArchiveRepository::with_root(&jar, &RelativePath::parse("repo")).unwrap();
        check_resolution(&repo, &reference)?;
    }

    #[test]
    fn foreign_prefixes_never_resolve(reference in reference()) {
        let (tree, repo) = directory_fixture();
        let other = DirectoryRepository::new(tree.path("repo")).unwrap();
        if let Some(resolved) = other.resolve_module_str(&reference) {
            prop_assert!(repo.resolve_module_path(&resolved).is_none());
            prop_assert!(repo.open_for_read(&resolved).is_err());
        }
    }
}
