pub mod memory;
pub mod object_store;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use object_store::{InMemoryObjectStore, LocalObjectStore};
pub use postgres::PostgresRepository;
pub use qrbridge_core::error::{Result, StorageError};
pub use qrbridge_core::repository::{
    GroupRepository, MappingRepository, ReadRepository, Repository,
};
