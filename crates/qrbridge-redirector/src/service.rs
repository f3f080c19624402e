use std::sync::Arc;

use crate::error::{RedirectorError, Result};
use crate::redirector::Redirector;
use async_trait::async_trait;
use qrbridge_core::{RandomLink, ReadRepository};
use tracing::{debug, trace, warn};

/// Service for handling redirects.
///
/// Holds a read-only repository; every call goes straight to the store.
#[derive(Debug)]
pub struct RedirectorService<R> {
    repository: Arc<R>,
}

impl<R> Clone for RedirectorService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: ReadRepository> RedirectorService<R> {
    pub fn new(repository: R) -> Self {
        Self::from_shared(Arc::new(repository))
    }

    /// Creates a service over a repository that is shared with other services.
    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Resolves the raw path parameter of a redirect request.
    ///
    /// # Returns
    ///
    /// * `Ok(url)` - The destination to redirect to
    /// * `Err(RandomLinkRequired)` - The parameter is absent or blank; the store is not queried
    /// * `Err(NotFound)` - No mapping uses the link
    /// * `Err(Storage)` - The lookup itself failed
    pub async fn redirect(&self, random_link: Option<&str>) -> Result<String> {
        let raw = random_link.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            debug!("redirect requested without a random link");
            return Err(RedirectorError::RandomLinkRequired);
        }

        let link = RandomLink::new_unchecked(raw);
        match self.resolve(&link).await {
            Ok(Some(url)) => {
                debug!(random_link = %link, url = %url, "redirecting");
                Ok(url)
            }
            Ok(None) => {
                debug!(random_link = %link, "no mapping found");
                Err(RedirectorError::NotFound(link.to_string()))
            }
            Err(e) => {
                warn!(random_link = %link, error = %e, "redirect lookup failed");
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<R: ReadRepository> Redirector for RedirectorService<R> {
    async fn resolve(&self, link: &RandomLink) -> Result<Option<String>> {
        trace!(random_link = %link, "resolving random link");
        Ok(self.repository.find_destination(link).await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use qrbridge_core::{MappingId, MappingRepository, NewMapping, StorageError};
    use qrbridge_storage::InMemoryRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts reads and optionally fails them.
    #[derive(Default)]
    pub(crate) struct SpyRepository {
        pub(crate) inner: InMemoryRepository,
        pub(crate) reads: AtomicUsize,
        pub(crate) fail: bool,
    }

    #[async_trait]
    impl ReadRepository for SpyRepository {
        async fn find_destination(
            &self,
            link: &RandomLink,
        ) -> qrbridge_core::error::Result<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StorageError::Unavailable("connection refused".to_string()));
            }
            self.inner.find_destination(link).await
        }

        async fn probe(&self) -> qrbridge_core::error::Result<Option<MappingId>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StorageError::Unavailable("connection refused".to_string()));
            }
            self.inner.probe().await
        }
    }

    async fn setup_with_mapping(link: &str, url: &str) -> RedirectorService<SpyRepository> {
        let repo = SpyRepository::default();
        repo.inner
            .insert_mapping(NewMapping {
                random_link: RandomLink::new_unchecked(link),
                website_link: url.to_string(),
                group_name: None,
            })
            .await
            .unwrap();
        RedirectorService::new(repo)
    }

    #[tokio::test]
    async fn redirect_existing_link() {
        let service = setup_with_mapping("ab12xy", "https://example.com").await;

        let url = service.redirect(Some("ab12xy")).await.unwrap();
        assert_eq!(url, "https://example.com");
    }

    #[tokio::test]
    async fn redirect_nonexistent_link() {
        let service = setup_with_mapping("ab12xy", "https://example.com").await;

        let err = service.redirect(Some("zz99zz")).await.unwrap_err();
        assert!(matches!(err, RedirectorError::NotFound(link) if link == "zz99zz"));
    }

    #[tokio::test]
    async fn missing_or_blank_link_skips_the_store() {
        let service = RedirectorService::new(SpyRepository::default());

        for raw in [None, Some(""), Some("   ")] {
            let err = service.redirect(raw).await.unwrap_err();
            assert!(matches!(err, RedirectorError::RandomLinkRequired));
        }
        assert_eq!(service.repository.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_failure_is_a_storage_error() {
        let service = RedirectorService::new(SpyRepository {
            fail: true,
            ..Default::default()
        });

        let err = service.redirect(Some("ab12xy")).await.unwrap_err();
        assert!(matches!(err, RedirectorError::Storage(StorageError::Unavailable(_))));
    }

    #[tokio::test]
    async fn resolve_returns_none_for_unknown_link() {
        let service = RedirectorService::new(InMemoryRepository::new());

        let result = service
            .resolve(&RandomLink::new_unchecked("nope"))
            .await
            .unwrap();
        assert!(result.is_none());
    }
}
