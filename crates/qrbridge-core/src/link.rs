use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Path under which the public redirect endpoint is mounted.
pub const REDIRECT_PATH: &str = "/api/redirect";

/// The short opaque token embedded in a redirect URL and a QR payload.
///
/// Links must be 1-64 characters long and contain only alphanumeric
/// characters, hyphens, or underscores.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RandomLink(String);

const MIN_LENGTH: usize = 1;
const MAX_LENGTH: usize = 64;

impl RandomLink {
    /// Creates a new `RandomLink` after validating the input.
    pub fn new(link: impl Into<String>) -> std::result::Result<Self, CoreError> {
        let link = link.into();
        Self::validate(&link)?;
        Ok(Self(link))
    }

    /// Creates a `RandomLink` without validation.
    ///
    /// Use this for lookups of values arriving from the outside world, and for
    /// links produced by trusted generators.
    pub fn new_unchecked(link: impl Into<String>) -> Self {
        Self(link.into())
    }

    /// Returns the link as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the URL a QR code for this link points at:
    /// `{domain}/api/redirect/{link}`.
    pub fn to_redirect_url(&self, domain: &str) -> String {
        format!("{}{}/{}", domain.trim_end_matches('/'), REDIRECT_PATH, self)
    }

    fn validate(link: &str) -> std::result::Result<(), CoreError> {
        if link.len() < MIN_LENGTH || link.len() > MAX_LENGTH {
            return Err(CoreError::InvalidRandomLink(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                link.len()
            )));
        }

        if !link
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidRandomLink(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                link
            )));
        }

        Ok(())
    }
}

impl Display for RandomLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_links() {
        assert!(RandomLink::new("a").is_ok());
        assert!(RandomLink::new("ab12xy").is_ok());
        assert!(RandomLink::new("Abc-123_xyz").is_ok());
        assert!(RandomLink::new("z".repeat(64)).is_ok());
    }

    #[test]
    fn empty_is_rejected() {
        assert!(RandomLink::new("").is_err());
    }

    #[test]
    fn too_long() {
        assert!(RandomLink::new("a".repeat(65)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(RandomLink::new("abc def").is_err());
        assert!(RandomLink::new("abc/def").is_err());
        assert!(RandomLink::new("abc?x=1").is_err());
    }

    #[test]
    fn redirect_url_trims_trailing_slash() {
        let link = RandomLink::new("ab12xy").unwrap();
        assert_eq!(
            link.to_redirect_url("https://qr.example"),
            "https://qr.example/api/redirect/ab12xy"
        );
        assert_eq!(
            link.to_redirect_url("https://qr.example/"),
            "https://qr.example/api/redirect/ab12xy"
        );
    }

    #[test]
    fn serializes_as_plain_string() {
        let link = RandomLink::new("ab12xy").unwrap();
        assert_eq!(link.to_string(), "ab12xy");
    }
}
