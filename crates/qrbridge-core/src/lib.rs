//! Core types and traits for the QR bridge link service.
//!
//! This crate provides the shared data model (mappings and groups), the
//! validated [`RandomLink`] lookup key, and the storage traits used by the
//! redirector, the admin layer and the gateway.

pub mod error;
pub mod link;
pub mod model;
pub mod object_store;
pub mod repository;
pub mod url;

pub use error::{CoreError, ObjectStoreError, StorageError};
pub use link::RandomLink;
pub use model::{Group, Mapping, MappingId, NewMapping};
pub use object_store::{ObjectStore, StoredObject, Upload};
pub use repository::{GroupRepository, MappingRepository, ReadRepository, Repository};
