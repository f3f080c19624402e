use qrbridge_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedirectorError>;

#[derive(Debug, Error)]
pub enum RedirectorError {
    #[error("random link is required")]
    RandomLinkRequired,
    #[error("no mapping found for random link: {0}")]
    NotFound(String),
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
}
