//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Application that allowed requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Route classification rule sets.
    pub routes: RoutesConfig,

    /// API key and login redirect settings.
    pub auth: AuthConfig,

    /// Session resolver settings.
    pub session: SessionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Admin API settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// How a configured route is compared against a request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Raw string prefix: `/pro` matches `/profile`.
    #[default]
    Prefix,
    /// Prefix must end on a `/` boundary: `/pro` matches `/pro/x` only.
    Segment,
}

/// Route classification rule sets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Routes forwarded without any check.
    pub public: Vec<String>,

    /// Routes that require a session.
    pub protected: Vec<String>,

    /// Routes that require an API key header.
    pub api: Vec<String>,

    /// Webhook path, verified by the receiving application.
    pub webhook_path: String,

    /// Static asset prefixes that never reach the access controller.
    pub excluded: Vec<String>,

    /// Route comparison mode.
    pub match_mode: MatchMode,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            public: vec![
                "/".to_string(),
                "/login".to_string(),
                "/register".to_string(),
                "/api/webhook".to_string(),
                "/public".to_string(),
            ],
            protected: vec![
                "/dashboard".to_string(),
                "/api/protected".to_string(),
                "/profile".to_string(),
            ],
            api: vec!["/api/data".to_string(), "/api/integration".to_string()],
            webhook_path: "/api/webhook".to_string(),
            excluded: vec![
                "/_next/static".to_string(),
                "/_next/image".to_string(),
                "/favicon.ico".to_string(),
            ],
            match_mode: MatchMode::Prefix,
        }
    }
}

/// API key and login redirect configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Header carrying the API key on gated routes.
    pub api_key_header: String,

    /// Login page unauthenticated users are redirected to.
    pub login_path: String,

    /// Query parameter holding the originally requested path.
    pub redirect_param: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key_header: "x-api-key".to_string(),
            login_path: "/login".to_string(),
            redirect_param: "redirect".to_string(),
        }
    }
}

/// What the controller does when the session resolver fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Treat the session as absent.
    #[default]
    FailClosed,
    /// Treat the session as present.
    FailOpen,
    /// Reject the request with 503.
    ServerError,
}

/// Session resolver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Base URL of the hosted auth service.
    pub auth_url: String,

    /// Public (anon) key sent as the `apikey` header.
    pub anon_key: String,

    /// Cookie holding the access token when no bearer header is present.
    pub access_token_cookie: String,

    /// Resolver timeout in milliseconds.
    pub timeout_ms: u64,

    /// Behavior on resolver failure.
    pub failure_policy: FailurePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auth_url: "http://127.0.0.1:54321".to_string(),
            anon_key: String::new(),
            access_token_cookie: "sb-access-token".to_string(),
            timeout_ms: 3000,
            failure_policy: FailurePolicy::FailClosed,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

pub(crate) const ADMIN_KEY_PLACEHOLDER: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            // WARNING: This is a placeholder! Change this in production.
            api_key: ADMIN_KEY_PLACEHOLDER.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.routes.match_mode, MatchMode::Prefix);
        assert_eq!(config.session.failure_policy, FailurePolicy::FailClosed);
        assert!(config.routes.public.contains(&"/".to_string()));
    }

    #[test]
    fn test_partial_sections() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [routes]
            protected = ["/account"]
            match_mode = "segment"

            [session]
            failure_policy = "server_error"
            timeout_ms = 500

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.routes.protected, vec!["/account".to_string()]);
        assert_eq!(config.routes.match_mode, MatchMode::Segment);
        // Untouched fields keep their defaults.
        assert_eq!(config.routes.webhook_path, "/api/webhook");
        assert_eq!(config.session.failure_policy, FailurePolicy::ServerError);
        assert_eq!(config.session.timeout_ms, 500);
        assert_eq!(config.session.access_token_cookie, "sb-access-token");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
