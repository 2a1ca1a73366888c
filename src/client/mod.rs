//! Admin API client.
//!
//! Wraps `reqwest` with a bearer-token interceptor:
//! - requests get `Authorization: Bearer <token>` injected, unless the path
//!   is exempt (the login endpoint) or the caller already set the header
//! - a `401` on an intercepted request drops the stored token and surfaces
//!   as [`ClientError::SessionExpired`]

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use reqwest::{
    header::{HeaderValue, AUTHORIZATION},
    Method, Request, RequestBuilder, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

/// Path that never receives the stored token.
pub const TOKEN_PATH: &str = "/token";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("no access token; log in first")]
    NotAuthenticated,

    #[error("session expired; log in again")]
    SessionExpired,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// HTTP client carrying an admin bearer token.
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
    token: ArcSwapOption<String>,
    exempt_paths: Vec<String>,
}

impl AdminClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            token: ArcSwapOption::empty(),
            exempt_paths: vec![TOKEN_PATH.to_string()],
        })
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.set_token(token);
        self
    }

    pub fn with_exempt_path(mut self, path: impl Into<String>) -> Self {
        self.exempt_paths.push(path.into());
        self
    }

    pub fn set_token(&self, token: impl Into<String>) {
        self.token.store(Some(Arc::new(token.into())));
    }

    pub fn clear_token(&self) {
        self.token.store(None);
    }

    pub fn token(&self) -> Option<Arc<String>> {
        self.token.load_full()
    }

    /// Start a request against a path relative to the base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.request(method, self.base_url.join(path)?))
    }

    /// Send a request through the token interceptor.
    pub async fn execute(&self, mut request: Request) -> Result<Response, ClientError> {
        let path = request.url().path();
        let exempt = self.exempt_paths.iter().any(|p| p == path);
        if exempt || request.headers().contains_key(AUTHORIZATION) {
            return Ok(self.http.execute(request).await?);
        }

        let token = self.token().ok_or(ClientError::NotAuthenticated)?;
        let value: HeaderValue = format!("Bearer {token}")
            .parse()
            .map_err(|_| ClientError::NotAuthenticated)?;
        request.headers_mut().insert(AUTHORIZATION, value);

        let response = self.http.execute(request).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %response.url(), "Admin token rejected; clearing it");
            self.clear_token();
            return Err(ClientError::SessionExpired);
        }
        Ok(response)
    }

    /// GET a path and decode a successful JSON answer.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.request(Method::GET, path)?.build()?;
        let response = self.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}
