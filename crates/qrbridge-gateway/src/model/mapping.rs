use jiff::Timestamp;
use qrbridge_core::{Mapping, MappingId, RandomLink};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Deserialize)]
pub struct MappingQuery {
    pub search: Option<String>,
    /// A group name, or `all`.
    pub group: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMappingRequest {
    pub website_link: String,
    pub group_name: Option<String>,
    pub random_link: Option<String>,
}

/// Absent fields are left alone; `"group_name": null` moves the mapping out
/// of its group.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMappingRequest {
    pub website_link: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub group_name: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct MappingResponse {
    pub id: MappingId,
    pub random_link: RandomLink,
    pub website_link: String,
    pub group_name: Option<String>,
    pub created_at: Timestamp,
    /// The URL encoded into the mapping's QR code.
    pub qr_target: String,
}

impl MappingResponse {
    pub fn new(mapping: Mapping, domain: &str) -> Self {
        Self {
            qr_target: mapping.random_link.to_redirect_url(domain),
            id: mapping.id,
            random_link: mapping.random_link,
            website_link: mapping.website_link,
            group_name: mapping.group_name,
            created_at: mapping.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_name_null_differs_from_absent() {
        let absent: UpdateMappingRequest =
            serde_json::from_str(r#"{"website_link":"https://example.com"}"#).unwrap();
        assert_eq!(absent.group_name, None);

        let cleared: UpdateMappingRequest = serde_json::from_str(r#"{"group_name":null}"#).unwrap();
        assert_eq!(cleared.group_name, Some(None));

        let moved: UpdateMappingRequest =
            serde_json::from_str(r#"{"group_name":"Marketing"}"#).unwrap();
        assert_eq!(moved.group_name, Some(Some("Marketing".to_string())));
    }
}
