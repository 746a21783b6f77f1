//! Error types for esm-repo

use std::path::PathBuf;

/// Result type for repository I/O
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building a repository from its base location.
///
/// These surface when the repository list is loaded or edited, never while a
/// module is being resolved.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("invalid base URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("unsupported scheme '{scheme}' in base URI '{uri}'")]
    UnsupportedScheme { uri: String, scheme: String },

    #[error("repository root {path} doesn't exist or isn't a directory")]
    NotADirectory { path: PathBuf },

    #[error("repository root {path} isn't readable: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open archive {path}: {source}")]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read archive {path}: {source}")]
    ArchiveIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("root entry '{entry}' not found in archive {archive}")]
    RootEntryMissing { archive: PathBuf, entry: String },

    #[error("root entry '{entry}' in archive {archive} isn't a directory")]
    RootEntryNotADirectory { archive: PathBuf, entry: String },
}

/// Errors raised while accessing an already resolved module.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("module path '{path}' doesn't belong to this repository")]
    ForeignPath { path: String },

    #[error("module '{path}' not found")]
    NotFound { path: String },

    #[error("module path '{path}' escapes the repository root")]
    Traversal { path: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read entry '{entry}' from archive {archive}: {source}")]
    Archive {
        archive: PathBuf,
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
