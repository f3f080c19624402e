use crate::error::ObjectStoreError;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, ObjectStoreError>;

/// A file handed over for storage, typically a group logo.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Storage for uploaded assets, addressed by key and exposed by public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Stores the upload and returns the public URL pointing at it.
    async fn put(&self, upload: Upload) -> Result<String>;

    /// Reads an object by key. Returns `None` if it does not exist.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>>;

    /// Maps a public URL back to a key, if the URL belongs to this store.
    fn key_for_url(&self, url: &str) -> Option<String>;

    /// Reads an object by the URL [`ObjectStore::put`] returned.
    ///
    /// URLs that belong elsewhere resolve to `None`.
    async fn fetch_url(&self, url: &str) -> Result<Option<StoredObject>> {
        match self.key_for_url(url) {
            Some(key) => self.get(&key).await,
            None => Ok(None),
        }
    }
}
