//! Error types
//!
//! `StorageError` covers the key-value store, `ClientError` covers the outbound
//! collaborators (encyclopedia and translation model), and `ApiError` is the
//! session-level error surfaced to callers.

use thiserror::Error;

/// Errors raised by key-value store implementations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Serialization error for key {key}: {message}")]
    Serialization { key: String, message: String },

    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by outbound collaborator clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A required field was missing or empty; nothing was sent.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Credentials or identifiers for the collaborator are missing.
    #[error("Collaborator not configured: {0}")]
    NotConfigured(String),

    /// Transport-level failure.
    #[error("Request failed: {0}")]
    Request(String),

    /// The collaborator answered with a non-success status.
    #[error("Request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// The collaborator answered with a body that could not be understood.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ClientError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            },
            None => ClientError::Request(err.to_string()),
        }
    }
}

/// Session-level errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Collaborator error: {0}")]
    ClientError(#[from] ClientError),

    #[error("Block not found: {0}")]
    BlockNotFound(String),

    #[error("Article not found: {0}")]
    ArticleNotFound(String),

    #[error("Binding {identity} already registered with a different value type")]
    BindingTypeMismatch { identity: String },

    #[error("Binding {0} has stopped")]
    BindingClosed(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
