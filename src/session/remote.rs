//! Session lookup against a hosted auth service.
//!
//! The access token is presented to `GET {auth_url}/auth/v1/user`. A `200`
//! means the token belongs to a live user; `401`/`403` mean it does not.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::SessionConfig;
use crate::observability::metrics;
use crate::session::{Credentials, ResolverError, Session, SessionResolver};

const USER_PATH: &str = "auth/v1/user";

#[derive(Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Resolves sessions over HTTP with a bounded timeout.
pub struct HttpSessionResolver {
    client: Client,
    user_url: String,
    anon_key: String,
    access_token_cookie: String,
    timeout_ms: u64,
}

impl HttpSessionResolver {
    pub fn new(config: &SessionConfig) -> Result<Self, ResolverError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| ResolverError::Transport(e.to_string()))?;

        let base = config.auth_url.trim_end_matches('/');
        Ok(Self {
            client,
            user_url: format!("{base}/{USER_PATH}"),
            anon_key: config.anon_key.clone(),
            access_token_cookie: config.access_token_cookie.clone(),
            timeout_ms: config.timeout_ms,
        })
    }

    async fn fetch_user(&self, token: &str) -> Result<Option<Session>, ResolverError> {
        let res = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        match res.status() {
            StatusCode::OK => {
                let user: UserResponse = res
                    .json()
                    .await
                    .map_err(|e| ResolverError::InvalidResponse(e.to_string()))?;
                Ok(Some(Session {
                    user_id: user.id,
                    email: user.email,
                }))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            other => Err(ResolverError::Status(other.as_u16())),
        }
    }

    fn map_transport(&self, e: reqwest::Error) -> ResolverError {
        if e.is_timeout() {
            ResolverError::Timeout(self.timeout_ms)
        } else {
            ResolverError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl SessionResolver for HttpSessionResolver {
    async fn resolve(&self, credentials: &Credentials) -> Result<Option<Session>, ResolverError> {
        let Some(token) = credentials.access_token(&self.access_token_cookie) else {
            return Ok(None);
        };

        let start = Instant::now();
        let result = self.fetch_user(token).await;
        metrics::record_resolver_duration(start);

        if let Err(e) = &result {
            tracing::debug!(error = %e, "Session lookup failed");
        }
        result
    }
}
