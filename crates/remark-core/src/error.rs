//! Error types for LandmarkRemark.

use thiserror::Error;

/// Result type alias using LandmarkRemark's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for landmark operations.
///
/// Every backend failure is folded into one of three kinds the UI can tell
/// apart: no connectivity, a record that did not resolve to exactly one
/// backend row, and anything else the backend reported.
#[derive(Error, Debug)]
pub enum Error {
    /// The backend could not be reached
    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    /// Update/delete target did not resolve to exactly one backend record
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Any other failure reported by the backend
    #[error("Backend error: {0}")]
    Backend(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Username/password pair rejected at login
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Username already registered at signup
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// Operation requires a logged-in user
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure was a connectivity problem rather than a rejection.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::NetworkUnavailable(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Error::NetworkUnavailable(e.to_string()),
            sqlx::Error::RowNotFound => Error::RecordNotFound(e.to_string()),
            other => Error::Backend(other.to_string()),
        }
    }
}
