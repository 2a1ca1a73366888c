//! API key checks for gated routes.

use axum::http::{HeaderMap, HeaderName};

/// Decides whether a request carries an acceptable API key.
pub trait ApiKeyValidator: Send + Sync {
    fn has_api_key(&self, headers: &HeaderMap) -> bool;
}

/// Accepts any non-empty value in the configured header.
///
/// The key itself is not checked against a store yet.
#[derive(Debug, Clone)]
pub struct HeaderPresence {
    header: HeaderName,
}

impl HeaderPresence {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }
}

impl ApiKeyValidator for HeaderPresence {
    fn has_api_key(&self, headers: &HeaderMap) -> bool {
        headers
            .get(&self.header)
            .map(|v| !v.as_bytes().trim_ascii().is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn validator() -> HeaderPresence {
        HeaderPresence::new(HeaderName::from_static("x-api-key"))
    }

    #[test]
    fn test_presence() {
        let mut headers = HeaderMap::new();
        assert!(!validator().has_api_key(&headers));

        let name = HeaderName::from_bytes(b"X-API-Key").unwrap();
        headers.insert(name, HeaderValue::from_static("abc123"));
        assert!(validator().has_api_key(&headers)); // Case insensitive
    }

    #[test]
    fn test_blank_value_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static(""));
        assert!(!validator().has_api_key(&headers));

        headers.insert("x-api-key", HeaderValue::from_static("   "));
        assert!(!validator().has_api_key(&headers));
    }
}
