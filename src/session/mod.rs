//! Session resolution.
//!
//! # Data Flow
//! ```text
//! Request headers
//!     → Credentials (bearer token, cookies)
//!     → SessionResolver::resolve (async, may fail)
//!     → Some(Session) | None | ResolverError
//! ```
//!
//! # Design Decisions
//! - Sessions are resolved on every request, never cached here
//! - Resolvers enforce their own timeout
//! - Absence is not an error; only infrastructure failures are

pub mod remote;

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use remote::HttpSessionResolver;

/// Proof of an authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Credentials a request carries, handed to the resolver as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Token from `Authorization: Bearer <token>`.
    pub bearer: Option<String>,
    /// Cookies from every `Cookie` header.
    pub cookies: BTreeMap<String, String>,
}

impl Credentials {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let mut cookies = BTreeMap::new();
        for value in headers.get_all(header::COOKIE) {
            let Ok(value) = value.to_str() else { continue };
            for pair in value.split(';') {
                if let Some((name, val)) = pair.trim().split_once('=') {
                    cookies.insert(name.trim().to_string(), val.trim().to_string());
                }
            }
        }

        Self { bearer, cookies }
    }

    /// Bearer token if present, otherwise the named cookie.
    pub fn access_token(&self, cookie_name: &str) -> Option<&str> {
        self.bearer
            .as_deref()
            .or_else(|| self.cookies.get(cookie_name).map(String::as_str))
            .filter(|t| !t.is_empty())
    }
}

/// Errors that can occur while resolving a session.
#[derive(Debug, Error)]
pub enum ResolverError {
    /// The auth service did not answer within the resolver timeout.
    #[error("session lookup timed out after {0} ms")]
    Timeout(u64),

    /// Connection or protocol failure.
    #[error("session lookup failed: {0}")]
    Transport(String),

    /// The auth service answered with an unexpected status.
    #[error("auth service returned status {0}")]
    Status(u16),

    /// The auth service answered with a body we could not read.
    #[error("invalid auth service response: {0}")]
    InvalidResponse(String),
}

impl ResolverError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ResolverError::Timeout(_) => "timeout",
            ResolverError::Transport(_) => "transport",
            ResolverError::Status(_) => "status",
            ResolverError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Resolves whether a request carries a valid session.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, credentials: &Credentials) -> Result<Option<Session>, ResolverError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_credentials_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok-1"));
        headers.append(header::COOKIE, HeaderValue::from_static("a=1; sb-access-token=tok-2"));
        headers.append(header::COOKIE, HeaderValue::from_static("b = 2"));

        let creds = Credentials::from_headers(&headers);
        assert_eq!(creds.bearer.as_deref(), Some("tok-1"));
        assert_eq!(creds.cookies.get("a").map(String::as_str), Some("1"));
        assert_eq!(creds.cookies.get("b").map(String::as_str), Some("2"));
        assert_eq!(creds.access_token("sb-access-token"), Some("tok-1"));
    }

    #[test]
    fn test_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        headers.insert(header::COOKIE, HeaderValue::from_static("sb-access-token=tok-2"));

        let creds = Credentials::from_headers(&headers);
        assert_eq!(creds.bearer, None);
        assert_eq!(creds.access_token("sb-access-token"), Some("tok-2"));
        assert_eq!(creds.access_token("other"), None);
    }

    #[test]
    fn test_empty_cookie_is_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sb-access-token="));
        assert_eq!(Credentials::from_headers(&headers).access_token("sb-access-token"), None);
    }
}
