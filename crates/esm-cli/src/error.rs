//! Error types for esm-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from esm-resolver
    #[error(transparent)]
    Resolver(#[from] esm_resolver::Error),

    /// Repository construction error from esm-repo
    #[error(transparent)]
    Configuration(#[from] esm_repo::ConfigurationError),

    /// Repository I/O error from esm-repo
    #[error(transparent)]
    Repository(#[from] esm_repo::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
