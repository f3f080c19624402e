use qrbridge_admin::Folder;
use serde::{Deserialize, Serialize};

use super::MappingResponse;

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FolderQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FolderResponse {
    /// `null` for the folder of ungrouped mappings.
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub mappings: Vec<MappingResponse>,
}

impl FolderResponse {
    pub fn new(folder: Folder, domain: &str) -> Self {
        Self {
            name: folder.name,
            image_url: folder.image_url,
            mappings: folder
                .mappings
                .into_iter()
                .map(|m| MappingResponse::new(m, domain))
                .collect(),
        }
    }
}
