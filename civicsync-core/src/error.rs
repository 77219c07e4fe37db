//! Error types for civicsync.

use thiserror::Error;

/// Errors that can occur during a sync pass.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Meeting source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Failed to {action} event '{title}': {message}")]
    Mutation {
        action: String,
        title: String,
        message: String,
    },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider '{0}' not found in PATH. Install it with:\n  cargo install {0}")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SyncError {
    /// Whether this error means the remote store can't be used at all.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SyncError::Auth(_) | SyncError::ProviderNotInstalled(_) | SyncError::Config(_)
        )
    }
}

/// Result type alias for civicsync operations.
pub type SyncResult<T> = Result<T, SyncError>;
