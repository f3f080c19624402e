use crate::error::Result;
use crate::link::RandomLink;
use crate::model::{Group, Mapping, MappingId, NewMapping};
use async_trait::async_trait;

/// A read-only view of the mapping store.
///
/// This is all the public surface (redirects and the keep-alive probe) needs.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the destination URL for a given random link.
    /// Returns `None` if no mapping uses the link.
    async fn find_destination(&self, link: &RandomLink) -> Result<Option<String>>;

    /// Issues the cheapest possible read: the id of at most one mapping.
    async fn probe(&self) -> Result<Option<MappingId>>;
}

#[async_trait]
pub trait MappingRepository: ReadRepository {
    /// Lists every mapping, newest first.
    async fn list_mappings(&self) -> Result<Vec<Mapping>>;

    async fn get_mapping(&self, id: MappingId) -> Result<Option<Mapping>>;

    /// Inserts a new mapping. Returns `Err(Conflict)` if the random link is taken.
    async fn insert_mapping(&self, mapping: NewMapping) -> Result<Mapping>;

    /// Sets the destination URL. Returns `true` if the mapping existed.
    async fn update_destination(&self, id: MappingId, website_link: &str) -> Result<bool>;

    /// Sets or clears the group. Returns `true` if the mapping existed.
    async fn update_group(&self, id: MappingId, group_name: Option<&str>) -> Result<bool>;

    /// Deletes a mapping. Returns `true` if the mapping existed and was removed.
    async fn delete_mapping(&self, id: MappingId) -> Result<bool>;

    /// Deletes every mapping referencing the group and returns how many were removed.
    async fn delete_mappings_in_group(&self, group_name: &str) -> Result<u64>;
}

#[async_trait]
pub trait GroupRepository: Send + Sync + 'static {
    /// Lists every group ordered by name.
    async fn list_groups(&self) -> Result<Vec<Group>>;

    async fn get_group(&self, name: &str) -> Result<Option<Group>>;

    /// Inserts a new group. Returns `Err(Conflict)` if the name is taken.
    async fn insert_group(&self, group: Group) -> Result<()>;

    /// Deletes the group row only. Returns `true` if it existed.
    async fn delete_group(&self, name: &str) -> Result<bool>;
}

/// A store that owns both tables.
pub trait Repository: MappingRepository + GroupRepository {}

impl<T: MappingRepository + GroupRepository> Repository for T {}
