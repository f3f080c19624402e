//! Projections of the mapping and group lists used by the admin screens.

use qrbridge_core::{Group, Mapping};
use serde::Serialize;
use std::collections::HashSet;

/// Which groups a table view shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GroupFilter {
    #[default]
    All,
    Named(String),
}

impl GroupFilter {
    /// Parses the query-string form, where `all` (or nothing) means no filter.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::All,
            Some(v) if v.eq_ignore_ascii_case("all") => Self::All,
            Some(v) => Self::Named(v.to_string()),
        }
    }

    fn matches(&self, mapping: &Mapping) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => mapping.group_name.as_deref() == Some(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingFilter {
    /// Free-text search, matched case-insensitively against the random link
    /// and the destination.
    pub search: Option<String>,
    pub group: GroupFilter,
}

impl MappingFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            group: GroupFilter::All,
        }
    }

    pub fn matches(&self, mapping: &Mapping) -> bool {
        self.group.matches(mapping) && matches_search(self.search.as_deref(), mapping)
    }
}

fn matches_search(search: Option<&str>, mapping: &Mapping) -> bool {
    let term = match search.map(str::trim) {
        None | Some("") => return true,
        Some(term) => term.to_lowercase(),
    };
    mapping.random_link.as_str().to_lowercase().contains(&term)
        || mapping.website_link.to_lowercase().contains(&term)
}

/// Filters the mappings for the table view, keeping their order.
pub fn table_view(mappings: &[Mapping], filter: &MappingFilter) -> Vec<Mapping> {
    mappings
        .iter()
        .filter(|m| filter.matches(m))
        .cloned()
        .collect()
}

/// One group folder in the folder view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Folder {
    /// `None` for the folder of mappings without a known group.
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub mappings: Vec<Mapping>,
}

/// Groups the mappings that match `search` into one folder per group.
///
/// Every group gets a folder, empty or not, in the order the groups are
/// given. Mappings without a group, or whose group no longer exists, are
/// collected in a trailing folder with no name that is left out when empty.
pub fn folder_view(groups: &[Group], mappings: &[Mapping], search: Option<&str>) -> Vec<Folder> {
    let known: HashSet<&str> = groups.iter().map(|g| g.name.as_str()).collect();
    let matching: Vec<&Mapping> = mappings
        .iter()
        .filter(|m| matches_search(search, m))
        .collect();

    let mut folders: Vec<Folder> = groups
        .iter()
        .map(|group| Folder {
            name: Some(group.name.clone()),
            image_url: group.image_url.clone(),
            mappings: matching
                .iter()
                .filter(|m| m.group_name.as_deref() == Some(group.name.as_str()))
                .map(|m| (*m).clone())
                .collect(),
        })
        .collect();

    let ungrouped: Vec<Mapping> = matching
        .iter()
        .filter(|m| !matches!(m.group_name.as_deref(), Some(name) if known.contains(name)))
        .map(|m| (*m).clone())
        .collect();
    if !ungrouped.is_empty() {
        folders.push(Folder {
            name: None,
            image_url: None,
            mappings: ungrouped,
        });
    }

    folders
}
