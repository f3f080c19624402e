use qrbridge_core::{RandomLink, Upload};
use serde::Serialize;

/// Parameters for creating a mapping.
#[derive(Debug, Clone)]
pub struct CreateMappingParams {
    /// The destination URL.
    pub website_link: String,
    /// The group to file the mapping under. Must already exist.
    pub group_name: Option<String>,
    /// A caller-chosen link. When `None`, one is generated.
    pub random_link: Option<RandomLink>,
}

/// A partial update of a mapping. Fields left `None` are not touched.
#[derive(Debug, Clone, Default)]
pub struct UpdateMappingParams {
    pub website_link: Option<String>,
    /// `Some(None)` moves the mapping out of any group.
    pub group_name: Option<Option<String>>,
}

impl UpdateMappingParams {
    pub fn is_empty(&self) -> bool {
        self.website_link.is_none() && self.group_name.is_none()
    }
}

/// Where a new group's logo comes from.
#[derive(Debug, Clone, Default)]
pub enum GroupImage {
    #[default]
    None,
    /// An already hosted image.
    Url(String),
    /// A file to push to the object store first.
    Upload(Upload),
}

#[derive(Debug, Clone)]
pub struct CreateGroupParams {
    pub name: String,
    pub image: GroupImage,
}

/// Outcome of a completed group deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDeletion {
    pub group: String,
    pub removed_mappings: u64,
}
