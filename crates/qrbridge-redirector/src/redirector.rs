use crate::Result;
use async_trait::async_trait;
use qrbridge_core::RandomLink;

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a random link to its destination URL.
    /// Returns `None` if no mapping uses the link.
    async fn resolve(&self, link: &RandomLink) -> Result<Option<String>>;
}
