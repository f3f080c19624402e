use thiserror::Error;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Validation errors raised before anything reaches a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid random link: {0}")]
    InvalidRandomLink(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid group name: {0}")]
    InvalidGroupName(String),
}

#[derive(Debug, Clone, Error)]
pub enum ObjectStoreError {
    #[error("object store unavailable: {0}")]
    Unavailable(String),
    #[error("object is invalid: {0}")]
    InvalidObject(String),
    #[error("object store operation failed: {0}")]
    Operation(String),
}
