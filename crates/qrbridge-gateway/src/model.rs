mod asset;
mod group;
mod health;
mod mapping;

pub use asset::UploadResponse;
pub use group::{CreateGroupRequest, FolderQuery, FolderResponse};
pub use health::{HealthResponse, KeepAliveFailure};
pub use mapping::{CreateMappingRequest, MappingQuery, MappingResponse, UpdateMappingRequest};
