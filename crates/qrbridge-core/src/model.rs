use crate::error::CoreError;
use crate::link::RandomLink;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const MAX_GROUP_NAME_LENGTH: usize = 100;

/// Store-generated identifier of a mapping row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingId(i64);

impl MappingId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for MappingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored association between a random link and its destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub id: MappingId,
    pub random_link: RandomLink,
    pub website_link: String,
    /// Name of the owning group. A reference by name, not enforced by the store.
    pub group_name: Option<String>,
    pub created_at: Timestamp,
}

/// The fields a caller supplies when inserting a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMapping {
    pub random_link: RandomLink,
    pub website_link: String,
    pub group_name: Option<String>,
}

/// A named collection of mappings, optionally carrying a logo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub image_url: Option<String>,
}

impl Group {
    /// Trims a group name and checks it is non-empty and reasonably short.
    pub fn normalize_name(name: &str) -> Result<String, CoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::InvalidGroupName(
                "group name cannot be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_GROUP_NAME_LENGTH {
            return Err(CoreError::InvalidGroupName(format!(
                "group name must be at most {} characters",
                MAX_GROUP_NAME_LENGTH
            )));
        }
        Ok(name.to_string())
    }
}
