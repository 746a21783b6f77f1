//! Persisted repository list

use std::path::Path;

use esm_fs::ConfigStore;
use esm_repo::{BaseUri, ConfigurationError, RepositoryFactory};
use serde::{Deserialize, Serialize};

use crate::{ModuleResolver, Result, SharedRepository};

/// Base-location URIs of the configured repositories.
///
/// ```toml
/// system = "archive:file:///usr/share/app/modules.jar!/js/v3"
/// repositories = [
///     "file:///home/me/scripts/modules/",
/// ]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub repositories: Vec<String>,
}

impl RepositorySettings {
    /// Load settings from a TOML, JSON or YAML file.
    ///
    /// A missing file yields empty settings.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No repository settings file, using defaults");
            return Ok(Self::default());
        }
        Ok(ConfigStore::new().load(path)?)
    }

    /// Save settings atomically, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        ConfigStore::new().save(path, self)?;
        tracing::debug!(path = %path.display(), count = self.repositories.len(), "Saved repository settings");
        Ok(())
    }

    /// Append `uri` unless an equal entry exists. Returns whether it was added.
    pub fn add(&mut self, uri: impl Into<String>) -> bool {
        let uri = uri.into();
        if self.contains(&uri) {
            return false;
        }
        self.repositories.push(uri);
        true
    }

    /// Remove every entry naming the same location as `uri`. Returns whether
    /// anything was removed.
    pub fn remove(&mut self, uri: &str) -> bool {
        let before = self.repositories.len();
        self.repositories.retain(|entry| !same_location(entry, uri));
        self.repositories.len() != before
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.repositories.iter().any(|entry| same_location(entry, uri))
    }
}

/// Compare two entries by parsed location when both parse, textually
/// otherwise.
fn same_location(a: &str, b: &str) -> bool {
    match (BaseUri::parse(a), BaseUri::parse(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.trim() == b.trim(),
    }
}

/// An entry that could not be turned into a repository.
#[derive(Debug)]
pub struct SkippedEntry {
    pub uri: String,
    pub error: ConfigurationError,
}

/// Outcome of [`ModuleResolver::load_settings`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Number of repositories built, including the system repository.
    pub loaded: usize,
    pub skipped: Vec<SkippedEntry>,
}

impl LoadReport {
    /// True if every configured entry was loaded.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

impl ModuleResolver {
    /// Create a resolver from settings. See [`load_settings`](Self::load_settings).
    pub fn from_settings(settings: &RepositorySettings) -> (Self, LoadReport) {
        let resolver = Self::new();
        let report = resolver.load_settings(settings);
        (resolver, report)
    }

    /// Replace the system repository and the user-defined list with the
    /// repositories named in `settings`.
    ///
    /// Entries that fail to build are logged, recorded in the report and
    /// skipped; they never prevent the others from loading.
    pub fn load_settings(&self, settings: &RepositorySettings) -> LoadReport {
        let mut report = LoadReport::default();

        let system = settings
            .system
            .as_deref()
            .and_then(|uri| build_or_skip(uri, &mut report));
        let repositories = settings
            .repositories
            .iter()
            .filter_map(|uri| build_or_skip(uri, &mut report))
            .collect();

        self.set_system_repository(system);
        self.set_repositories(repositories);

        tracing::info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "Loaded module repositories from settings"
        );
        report
    }

    /// The current repository list in persisted form.
    pub fn to_settings(&self) -> RepositorySettings {
        RepositorySettings {
            system: self
                .system_repository()
                .map(|repo| repo.base_uri().to_string()),
            repositories: self
                .repositories()
                .iter()
                .map(|repo| repo.base_uri().to_string())
                .collect(),
        }
    }
}

fn build_or_skip(uri: &str, report: &mut LoadReport) -> Option<SharedRepository> {
    match RepositoryFactory::parse(uri) {
        Ok(repository) => {
            report.loaded += 1;
            Some(repository)
        }
        Err(error) => {
            tracing::warn!(uri, error = %error, "Skipping module repository that failed to load");
            report.skipped.push(SkippedEntry {
                uri: uri.to_owned(),
                error,
            });
            None
        }
    }
}
