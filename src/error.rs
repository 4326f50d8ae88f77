//! Error types for cloudrive.

use thiserror::Error;

/// Common error type for cloudrive.
#[derive(Error, Debug)]
pub enum DriveError {
    /// Error reported by the managed backend (document database or object storage).
    #[error("backend error: {0}")]
    Backend(String),

    /// Local database error (favorites store).
    ///
    /// Errors from sqlx are automatically converted.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Email delivery error.
    #[error("mail error: {0}")]
    Mail(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DriveError {
    fn from(e: sqlx::Error) -> Self {
        DriveError::Database(e.to_string())
    }
}

impl From<reqwest::Error> for DriveError {
    fn from(e: reqwest::Error) -> Self {
        DriveError::Backend(e.to_string())
    }
}

impl From<serde_json::Error> for DriveError {
    fn from(e: serde_json::Error) -> Self {
        DriveError::Backend(format!("malformed payload: {e}"))
    }
}

/// Result type alias for cloudrive operations.
pub type Result<T> = std::result::Result<T, DriveError>;
