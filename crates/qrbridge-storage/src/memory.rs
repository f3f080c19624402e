use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use qrbridge_core::error::{Result, StorageError};
use qrbridge_core::repository::{GroupRepository, MappingRepository, ReadRepository};
use qrbridge_core::{Group, Mapping, MappingId, NewMapping, RandomLink};
use std::sync::atomic::{AtomicI64, Ordering};

/// In-memory implementation of the repository traits using DashMap.
///
/// Mirrors the PostgreSQL schema: ids are sequential, `random_link` and group
/// names are unique, and `group_name` is a plain reference that nothing keeps
/// consistent.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    mappings: DashMap<MappingId, Mapping>,
    /// Unique index over `random_link`.
    links: DashMap<String, MappingId>,
    groups: DashMap<String, Group>,
    next_id: AtomicI64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn remove_mapping(&self, id: MappingId) -> bool {
        match self.mappings.remove(&id) {
            Some((_, mapping)) => {
                self.links.remove(mapping.random_link.as_str());
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_destination(&self, link: &RandomLink) -> Result<Option<String>> {
        let Some(id) = self.links.get(link.as_str()).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self
            .mappings
            .get(&id)
            .map(|mapping| mapping.website_link.clone()))
    }

    async fn probe(&self) -> Result<Option<MappingId>> {
        Ok(self.mappings.iter().next().map(|entry| *entry.key()))
    }
}

#[async_trait]
impl MappingRepository for InMemoryRepository {
    async fn list_mappings(&self) -> Result<Vec<Mapping>> {
        let mut mappings: Vec<Mapping> = self
            .mappings
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        mappings.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(mappings)
    }

    async fn get_mapping(&self, id: MappingId) -> Result<Option<Mapping>> {
        Ok(self.mappings.get(&id).map(|mapping| mapping.clone()))
    }

    async fn insert_mapping(&self, new: NewMapping) -> Result<Mapping> {
        // The index entry guard is held until the row is in place, so two
        // inserts of the same link cannot both succeed.
        match self.links.entry(new.random_link.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(new.random_link.to_string())),
            Entry::Vacant(slot) => {
                let id = MappingId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
                let mapping = Mapping {
                    id,
                    random_link: new.random_link,
                    website_link: new.website_link,
                    group_name: new.group_name,
                    created_at: Timestamp::now(),
                };
                self.mappings.insert(id, mapping.clone());
                slot.insert(id);
                Ok(mapping)
            }
        }
    }

    async fn update_destination(&self, id: MappingId, website_link: &str) -> Result<bool> {
        Ok(match self.mappings.get_mut(&id) {
            Some(mut mapping) => {
                mapping.website_link = website_link.to_owned();
                true
            }
            None => false,
        })
    }

    async fn update_group(&self, id: MappingId, group_name: Option<&str>) -> Result<bool> {
        Ok(match self.mappings.get_mut(&id) {
            Some(mut mapping) => {
                mapping.group_name = group_name.map(str::to_owned);
                true
            }
            None => false,
        })
    }

    async fn delete_mapping(&self, id: MappingId) -> Result<bool> {
        Ok(self.remove_mapping(id))
    }

    async fn delete_mappings_in_group(&self, group_name: &str) -> Result<u64> {
        let ids: Vec<MappingId> = self
            .mappings
            .iter()
            .filter(|entry| entry.group_name.as_deref() == Some(group_name))
            .map(|entry| *entry.key())
            .collect();

        let removed = ids.into_iter().filter(|id| self.remove_mapping(*id)).count();
        Ok(removed as u64)
    }
}

#[async_trait]
impl GroupRepository for InMemoryRepository {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .groups
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    async fn get_group(&self, name: &str) -> Result<Option<Group>> {
        Ok(self.groups.get(name).map(|group| group.clone()))
    }

    async fn insert_group(&self, group: Group) -> Result<()> {
        match self.groups.entry(group.name.clone()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(group.name)),
            Entry::Vacant(slot) => {
                slot.insert(group);
                Ok(())
            }
        }
    }

    async fn delete_group(&self, name: &str) -> Result<bool> {
        Ok(self.groups.remove(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_mapping(link: &str, url: &str, group: Option<&str>) -> NewMapping {
        NewMapping {
            random_link: RandomLink::new_unchecked(link),
            website_link: url.to_string(),
            group_name: group.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn insert_and_find_destination() {
        let repo = InMemoryRepository::new();

        let mapping = repo
            .insert_mapping(new_mapping("ab12xy", "https://example.com", None))
            .await
            .unwrap();
        assert_eq!(mapping.id, MappingId::new(1));

        let destination = repo
            .find_destination(&RandomLink::new_unchecked("ab12xy"))
            .await
            .unwrap();
        assert_eq!(destination.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn find_nonexistent() {
        let repo = InMemoryRepository::new();

        let destination = repo
            .find_destination(&RandomLink::new_unchecked("nope"))
            .await
            .unwrap();
        assert!(destination.is_none());
    }

    #[tokio::test]
    async fn insert_conflict() {
        let repo = InMemoryRepository::new();

        repo.insert_mapping(new_mapping("ab12xy", "https://example.com", None))
            .await
            .unwrap();
        let err = repo
            .insert_mapping(new_mapping("ab12xy", "https://other.com", None))
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(repo.list_mappings().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let repo = InMemoryRepository::new();
        for link in ["first", "second", "third"] {
            repo.insert_mapping(new_mapping(link, "https://example.com", None))
                .await
                .unwrap();
        }

        let links: Vec<String> = repo
            .list_mappings()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.random_link.to_string())
            .collect();
        assert_eq!(links, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn update_destination_and_group() {
        let repo = InMemoryRepository::new();
        let mapping = repo
            .insert_mapping(new_mapping("ab12xy", "https://old.example", Some("A")))
            .await
            .unwrap();

        assert!(repo
            .update_destination(mapping.id, "https://new.example")
            .await
            .unwrap());
        assert!(repo.update_group(mapping.id, None).await.unwrap());

        let stored = repo.get_mapping(mapping.id).await.unwrap().unwrap();
        assert_eq!(stored.website_link, "https://new.example");
        assert_eq!(stored.group_name, None);

        assert!(!repo
            .update_destination(MappingId::new(99), "https://x.example")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn delete_frees_the_random_link() {
        let repo = InMemoryRepository::new();
        let mapping = repo
            .insert_mapping(new_mapping("ab12xy", "https://example.com", None))
            .await
            .unwrap();

        assert!(repo.delete_mapping(mapping.id).await.unwrap());
        assert!(!repo.delete_mapping(mapping.id).await.unwrap());
        assert!(repo
            .find_destination(&RandomLink::new_unchecked("ab12xy"))
            .await
            .unwrap()
            .is_none());

        repo.insert_mapping(new_mapping("ab12xy", "https://again.example", None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_mappings_in_group_only_touches_that_group() {
        let repo = InMemoryRepository::new();
        repo.insert_mapping(new_mapping("a1", "https://a.example", Some("Marketing")))
            .await
            .unwrap();
        repo.insert_mapping(new_mapping("a2", "https://b.example", Some("Marketing")))
            .await
            .unwrap();
        repo.insert_mapping(new_mapping("b1", "https://c.example", Some("Products")))
            .await
            .unwrap();
        repo.insert_mapping(new_mapping("c1", "https://d.example", None))
            .await
            .unwrap();

        let removed = repo.delete_mappings_in_group("Marketing").await.unwrap();
        assert_eq!(removed, 2);

        let remaining: Vec<String> = repo
            .list_mappings()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.random_link.to_string())
            .collect();
        assert_eq!(remaining, ["c1", "b1"]);
    }

    #[tokio::test]
    async fn groups_are_unique_and_sorted() {
        let repo = InMemoryRepository::new();
        for name in ["Products", "General", "Marketing"] {
            repo.insert_group(Group {
                name: name.to_string(),
                image_url: None,
            })
            .await
            .unwrap();
        }

        let err = repo
            .insert_group(Group {
                name: "General".to_string(),
                image_url: Some("https://cdn.example/logo.png".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));

        let names: Vec<String> = repo
            .list_groups()
            .await
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, ["General", "Marketing", "Products"]);

        assert!(repo.delete_group("General").await.unwrap());
        assert!(!repo.delete_group("General").await.unwrap());
    }

    #[tokio::test]
    async fn probe_reports_any_row() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.probe().await.unwrap(), None);

        repo.insert_mapping(new_mapping("ab12xy", "https://example.com", None))
            .await
            .unwrap();
        assert_eq!(repo.probe().await.unwrap(), Some(MappingId::new(1)));
    }
}
