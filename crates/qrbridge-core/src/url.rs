use crate::error::CoreError;

/// Validates that a destination URL is an absolute `http`/`https` URL with a host.
pub fn validate_website_link(url: &str) -> Result<(), CoreError> {
    if url.trim().is_empty() {
        return Err(CoreError::InvalidUrl("URL cannot be empty".to_string()));
    }

    if url.chars().any(char::is_control) {
        return Err(CoreError::InvalidUrl(format!(
            "URL must not contain control characters: {:?}",
            url
        )));
    }

    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(CoreError::InvalidUrl(format!(
            "URL must have a valid scheme and host: {}",
            url
        )));
    };

    let scheme = scheme.to_lowercase();
    if scheme != "http" && scheme != "https" {
        return Err(CoreError::InvalidUrl(format!(
            "URL scheme must be http or https: {}",
            scheme
        )));
    }

    let host = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .rsplit('@')
        .next()
        .unwrap_or_default();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidUrl(format!(
            "URL must have a valid scheme and host: {}",
            url
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_website_link("https://example.com").is_ok());
        assert!(validate_website_link("http://example.com/path?q=1#top").is_ok());
        assert!(validate_website_link("HTTPS://user@example.com:8443/").is_ok());
    }

    #[test]
    fn rejects_missing_scheme_or_host() {
        assert!(validate_website_link("").is_err());
        assert!(validate_website_link("example.com").is_err());
        assert!(validate_website_link("https://").is_err());
        assert!(validate_website_link("https:///path").is_err());
    }

    #[test]
    fn rejects_other_schemes() {
        let err = validate_website_link("javascript://alert(1)").unwrap_err();
        assert!(matches!(err, CoreError::InvalidUrl(_)));
        assert!(validate_website_link("ftp://example.com").is_err());
    }

    #[test]
    fn rejects_control_characters_anywhere() {
        for url in [
            "https://example.com/a\nb",
            "https://example.com/?q=\r\nSet-Cookie:x",
            "https://example.com/\tpath",
            "https://example.com#\u{7f}",
        ] {
            let err = validate_website_link(url).unwrap_err();
            assert!(matches!(err, CoreError::InvalidUrl(_)), "{url:?}");
        }
        assert!(validate_website_link("https://example.com/caf\u{e9}").is_ok());
    }
}
