//! Settings file location and resolver construction

use std::path::PathBuf;

use colored::Colorize;
use esm_repo::{BaseUri, RepositoryFactory};
use esm_resolver::{ModuleResolver, RepositorySettings, SharedRepository};

use crate::cli::Cli;
use crate::error::{CliError, Result};

const CONFIG_DIR: &str = "esm-resolver";
const CONFIG_FILE: &str = "repositories.toml";

/// Options shared by all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// `None` when neither `--config` nor a platform config directory is
    /// available.
    pub config_path: Option<PathBuf>,
    pub system: Option<String>,
    pub repos: Vec<String>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Self {
        Self::with_default_config(cli, default_config_path())
    }

    /// Like [`from_cli`](Self::from_cli), with `default_config` used when
    /// `--config` is absent.
    pub fn with_default_config(cli: &Cli, default_config: Option<PathBuf>) -> Self {
        Self {
            config_path: cli.config.clone().or(default_config),
            system: cli.system.clone(),
            repos: cli.repos.clone(),
        }
    }

    /// Settings file location for messages.
    pub fn config_display(&self) -> String {
        match &self.config_path {
            Some(path) => path.display().to_string(),
            None => "<no config directory>".to_owned(),
        }
    }

    /// Load the settings file; without a settings location this is empty.
    pub fn load_settings(&self) -> Result<RepositorySettings> {
        match &self.config_path {
            Some(path) => Ok(RepositorySettings::load(path)?),
            None => {
                tracing::debug!("No settings location; starting from empty settings");
                Ok(RepositorySettings::default())
            }
        }
    }

    pub fn save_settings(&self, settings: &RepositorySettings) -> Result<()> {
        let path = self.config_path.as_ref().ok_or_else(|| {
            CliError::user("Could not determine the config directory; pass --config or set ESM_CONFIG")
        })?;
        Ok(settings.save(path)?)
    }

    /// Build a resolver from the settings file plus the command-line
    /// overrides.
    ///
    /// Configured entries that fail to load are reported as warnings.
    /// Repositories given on the command line must load.
    pub fn resolver(&self) -> Result<ModuleResolver> {
        let settings = self.load_settings()?;
        let (resolver, report) = ModuleResolver::from_settings(&settings);
        for skipped in &report.skipped {
            eprintln!(
                "{} skipping repository {}: {}",
                "warning:".yellow().bold(),
                skipped.uri,
                skipped.error
            );
        }

        if let Some(system) = &self.system {
            resolver.set_system_repository(Some(build(system)?));
        }
        for location in &self.repos {
            resolver.add_repository(build(location)?);
        }
        Ok(resolver)
    }
}

/// Build a repository from a base URI or a plain path.
pub fn build(location: &str) -> Result<SharedRepository> {
    let uri = BaseUri::parse_or_path(location)?;
    Ok(RepositoryFactory::build(&uri)?)
}

/// Normalize a location to the base URI stored in the settings file.
pub fn normalize(location: &str) -> Result<String> {
    Ok(BaseUri::parse_or_path(location)?.to_string())
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
}
