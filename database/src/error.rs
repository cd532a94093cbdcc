use thiserror::Error;

/// Errors surfaced by a [`crate::Database`] backend
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// The backend could not be reached or dropped the request
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    /// The caller is not allowed to read the requested path
    #[error("Permission denied reading {0}")]
    PermissionDenied(String),

    /// The path is empty or contains an empty segment
    #[error("Invalid path: {0:?}")]
    InvalidPath(String),

    /// A scan targeted a path whose value is not a mapping
    #[error("Value at {0} is not a mapping")]
    NotAMapping(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
