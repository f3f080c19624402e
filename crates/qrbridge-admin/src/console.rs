use crate::error::{AdminError, Result};
use crate::params::{CreateGroupParams, CreateMappingParams, GroupDeletion, UpdateMappingParams};
use crate::service::AdminService;
use crate::view::{folder_view, table_view, Folder, MappingFilter};
use jiff::Timestamp;
use qrbridge_core::{Group, Mapping, MappingId, Repository};
use qrbridge_generator::Generator;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Both admin lists as fetched together from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mappings: Vec<Mapping>,
    pub groups: Vec<Group>,
    pub fetched_at: Timestamp,
}

/// Read-through cache of the admin lists in front of an [`AdminService`].
///
/// Mutations that succeed drop the snapshot and fetch a fresh one. Failed
/// mutations leave it as it was, except for a partially deleted group, where
/// the store has already changed.
pub struct AdminConsole<R, G> {
    service: AdminService<R, G>,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
}

impl<R: Repository, G: Generator> AdminConsole<R, G> {
    pub fn new(service: AdminService<R, G>) -> Self {
        Self {
            service,
            snapshot: RwLock::new(None),
        }
    }

    pub fn service(&self) -> &AdminService<R, G> {
        &self.service
    }

    /// Returns the current snapshot, fetching it first if there is none.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let mut guard = self.snapshot.write().await;
        if let Some(snapshot) = guard.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let mappings = self.service.list_mappings().await?;
        let groups = self.service.list_groups().await?;
        let snapshot = Arc::new(Snapshot {
            mappings,
            groups,
            fetched_at: Timestamp::now(),
        });
        debug!(
            mappings = snapshot.mappings.len(),
            groups = snapshot.groups.len(),
            "fetched admin snapshot"
        );
        *guard = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    pub async fn invalidate(&self) {
        *self.snapshot.write().await = None;
    }

    /// Mappings for the table view.
    pub async fn table(&self, filter: &MappingFilter) -> Result<Vec<Mapping>> {
        let snapshot = self.snapshot().await?;
        Ok(table_view(&snapshot.mappings, filter))
    }

    /// Mappings for the folder view.
    pub async fn folders(&self, search: Option<&str>) -> Result<Vec<Folder>> {
        let snapshot = self.snapshot().await?;
        Ok(folder_view(&snapshot.groups, &snapshot.mappings, search))
    }

    pub async fn groups(&self) -> Result<Vec<Group>> {
        Ok(self.snapshot().await?.groups.clone())
    }

    pub async fn create_mapping(&self, params: CreateMappingParams) -> Result<Mapping> {
        let mapping = self.service.create_mapping(params).await?;
        self.refresh().await;
        Ok(mapping)
    }

    pub async fn update_mapping(&self, id: MappingId, params: UpdateMappingParams) -> Result<()> {
        self.service.update_mapping(id, params).await?;
        self.refresh().await;
        Ok(())
    }

    pub async fn delete_mapping(&self, id: MappingId) -> Result<()> {
        self.service.delete_mapping(id).await?;
        self.refresh().await;
        Ok(())
    }

    pub async fn create_group(&self, params: CreateGroupParams) -> Result<Group> {
        let group = self.service.create_group(params).await?;
        self.refresh().await;
        Ok(group)
    }

    pub async fn delete_group(&self, name: &str) -> Result<GroupDeletion> {
        match self.service.delete_group(name).await {
            Ok(deletion) => {
                self.refresh().await;
                Ok(deletion)
            }
            Err(err @ AdminError::PartialGroupDeletion { .. }) => {
                self.invalidate().await;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Drops the snapshot and fetches a new one. A failed fetch is logged and
    /// leaves the console empty, so the next read tries again.
    async fn refresh(&self) {
        self.invalidate().await;
        if let Err(e) = self.snapshot().await {
            warn!(error = %e, "failed to re-fetch admin lists after a mutation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::{group_params, mapping_params, test_service};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn reads_are_served_from_the_snapshot() {
        let (service, _) = test_service();
        let console = AdminConsole::new(service);

        let first = console.snapshot().await.unwrap();
        let second = console.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.mappings.is_empty());
    }

    #[tokio::test]
    async fn successful_mutation_refreshes_the_snapshot() {
        let (service, _) = test_service();
        let console = AdminConsole::new(service);
        let before = console.snapshot().await.unwrap();

        console.create_group(group_params("Marketing")).await.unwrap();
        let mapping = console
            .create_mapping(mapping_params("https://example.com", Some("Marketing")))
            .await
            .unwrap();

        let after = console.snapshot().await.unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.mappings, vec![mapping.clone()]);
        assert_eq!(after.groups.len(), 1);

        console
            .update_mapping(
                mapping.id,
                UpdateMappingParams {
                    website_link: Some("https://example.org".to_string()),
                    group_name: None,
                },
            )
            .await
            .unwrap();
        let rows = console.table(&MappingFilter::default()).await.unwrap();
        assert_eq!(rows[0].website_link, "https://example.org");
    }

    #[tokio::test]
    async fn failed_mutation_leaves_the_snapshot_untouched() {
        let (service, repo) = test_service();
        let console = AdminConsole::new(service);
        console
            .create_mapping(mapping_params("https://example.com", None))
            .await
            .unwrap();
        let before = console.snapshot().await.unwrap();

        repo.fail_writes.store(true, Ordering::SeqCst);
        let err = console
            .create_mapping(mapping_params("https://example.org", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminError::Storage(_)));

        let after = console.snapshot().await.unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn partial_group_deletion_drops_the_snapshot() {
        let (service, repo) = test_service();
        let console = AdminConsole::new(service);
        console.create_group(group_params("Marketing")).await.unwrap();
        console
            .create_mapping(mapping_params("https://example.com", Some("Marketing")))
            .await
            .unwrap();
        assert_eq!(console.snapshot().await.unwrap().mappings.len(), 1);

        repo.fail_group_delete.store(true, Ordering::SeqCst);
        let err = console.delete_group("Marketing").await.unwrap_err();
        assert!(matches!(err, AdminError::PartialGroupDeletion { .. }));

        let snapshot = console.snapshot().await.unwrap();
        assert!(snapshot.mappings.is_empty());
        assert_eq!(snapshot.groups.len(), 1);

        let folders = console.folders(None).await.unwrap();
        assert_eq!(folders.len(), 1);
        assert!(folders[0].mappings.is_empty());
    }
}
