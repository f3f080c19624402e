use qrbridge_core::{CoreError, MappingId, ObjectStoreError, StorageError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdminError>;

#[derive(Debug, Clone, Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] CoreError),
    #[error("group does not exist: {0}")]
    UnknownGroup(String),
    #[error("mapping not found: {0}")]
    MappingNotFound(MappingId),
    #[error("group not found: {0}")]
    GroupNotFound(String),
    #[error("already exists: {0}")]
    Conflict(String),
    #[error("no unique random link after {0} attempts")]
    LinksExhausted(usize),
    #[error("image upload failed: {0}")]
    Upload(#[from] ObjectStoreError),
    /// The group's mappings were deleted but the group row was not.
    /// Deleting the group again finishes the job.
    #[error("group '{group}' partially deleted: {removed_mappings} mappings removed but the group remains: {source}")]
    PartialGroupDeletion {
        group: String,
        removed_mappings: u64,
        #[source]
        source: StorageError,
    },
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for AdminError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Conflict(key) => Self::Conflict(key),
            other => Self::Storage(other),
        }
    }
}
