//! Error types for esm-resolver

use std::path::PathBuf;

/// Result type for esm-resolver operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in esm-resolver operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A namespaced path whose repository isn't registered (any more)
    #[error("No registered repository owns module path '{path}'")]
    UnownedPath { path: String },

    /// A namespaced path that no longer resolves inside its repository
    #[error("Module not found: {path}")]
    NotFound { path: String },

    /// Module handles must carry a repository marker
    #[error("Invalid module handle '{handle}': expected /es-module-repo/<uuid>/...")]
    InvalidHandle { handle: String },

    /// Write-family operation on the read-only module space
    #[error("Operation '{operation}' is not supported on module path '{path}'")]
    Unsupported { operation: &'static str, path: String },

    #[error("Module path '{path}' is read-only")]
    ReadOnly { path: String },

    #[error("Access denied: {path}")]
    AccessDenied { path: PathBuf },

    #[error("Unsupported URI '{uri}': only file URIs can be parsed")]
    UnsupportedUri { uri: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Repository error from esm-repo
    #[error(transparent)]
    Repository(#[from] esm_repo::Error),

    /// Repository construction error from esm-repo
    #[error(transparent)]
    Configuration(#[from] esm_repo::ConfigurationError),

    /// Filesystem or settings error from esm-fs
    #[error(transparent)]
    Fs(#[from] esm_fs::Error),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
