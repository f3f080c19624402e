//! Object stores for uploaded group images.
//!
//! Both backends hand out URLs of the form `{base_url}/{key}`; the gateway
//! serves those keys back from `/assets/{key}`.

use async_trait::async_trait;
use dashmap::DashMap;
use jiff::Timestamp;
use qrbridge_core::error::ObjectStoreError;
use qrbridge_core::object_store::{ObjectStore, StoredObject, Upload};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

type Result<T> = std::result::Result<T, ObjectStoreError>;

const MAX_FILE_NAME_LENGTH: usize = 64;

/// Builds a collision-resistant key from an uploaded file name.
///
/// Only the final path component survives, and every character outside
/// `[A-Za-z0-9._-]` becomes `-`.
fn object_key(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim_start_matches('.');
    let mut sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    if sanitized.len() > MAX_FILE_NAME_LENGTH {
        sanitized = sanitized.split_off(sanitized.len() - MAX_FILE_NAME_LENGTH);
    }
    if sanitized.is_empty() {
        sanitized.push_str("upload");
    }
    format!("{}-{}", Timestamp::now().as_nanosecond(), sanitized)
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}

/// Guesses a MIME type from a key's extension. Only raster image types are
/// recognised; anything else is served as an opaque download.
pub fn content_type_for(key: &str) -> Option<&'static str> {
    let extension = key.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn strip_base<'a>(base_url: &str, url: &'a str) -> Option<&'a str> {
    let key = url
        .strip_prefix(base_url.trim_end_matches('/'))?
        .strip_prefix('/')?;
    is_valid_key(key).then_some(key)
}

/// Keeps uploads in memory. Intended for tests and throwaway local runs.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    base_url: String,
    objects: DashMap<String, StoredObject>,
}

impl InMemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: DashMap::new(),
        }
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, upload: Upload) -> Result<String> {
        if upload.bytes.is_empty() {
            return Err(ObjectStoreError::InvalidObject("upload is empty".to_string()));
        }
        let key = object_key(&upload.file_name);
        self.objects.insert(
            key.clone(),
            StoredObject {
                content_type: content_type_for(&key).map(str::to_owned),
                bytes: upload.bytes,
            },
        );
        debug!(key = %key, "stored object in memory");
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        Ok(self.objects.get(key).map(|object| object.clone()))
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        strip_base(&self.base_url, url).map(str::to_owned)
    }
}

/// Writes uploads into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
    base_url: String,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

fn map_io_error(err: std::io::Error) -> ObjectStoreError {
    match err.kind() {
        ErrorKind::PermissionDenied | ErrorKind::NotConnected => {
            ObjectStoreError::Unavailable(err.to_string())
        }
        _ => ObjectStoreError::Operation(err.to_string()),
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, upload: Upload) -> Result<String> {
        if upload.bytes.is_empty() {
            return Err(ObjectStoreError::InvalidObject("upload is empty".to_string()));
        }
        let key = object_key(&upload.file_name);
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(map_io_error)?;
        tokio::fs::write(self.root.join(&key), &upload.bytes)
            .await
            .map_err(map_io_error)?;
        debug!(key = %key, root = %self.root.display(), "stored object on disk");
        Ok(format!("{}/{}", self.base_url.trim_end_matches('/'), key))
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        if !is_valid_key(key) {
            return Ok(None);
        }
        match tokio::fs::read(self.root.join(key)).await {
            Ok(bytes) => Ok(Some(StoredObject {
                content_type: content_type_for(key).map(str::to_owned),
                bytes,
            })),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(map_io_error(err)),
        }
    }

    fn key_for_url(&self, url: &str) -> Option<String> {
        strip_base(&self.base_url, url).map(str::to_owned)
    }
}
