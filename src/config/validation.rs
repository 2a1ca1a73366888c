//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate route shapes, header names, addresses and timeouts
//! - Detect overlapping rule sets
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Overlaps are reported, not rejected: the controller evaluates in a
//!   fixed order and the operator owns disjointness

use std::str::FromStr;

use axum::http::{uri::Authority, HeaderName};
use thiserror::Error;

use crate::access::rules::route_matches;
use crate::config::schema::{GatewayConfig, MatchMode, ADMIN_KEY_PLACEHOLDER};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("routes.{set}: route {route:?} must be non-empty and start with '/'")]
    InvalidRoute { set: &'static str, route: String },

    #[error("routes.{set}: duplicate route {route:?}")]
    DuplicateRoute { set: &'static str, route: String },

    #[error("{field}: path {path:?} must start with '/'")]
    InvalidPath { field: &'static str, path: String },

    #[error("auth.login_path {0:?} is covered by a protected route")]
    LoginProtected(String),

    #[error("auth.api_key_header {0:?} is not a valid header name")]
    InvalidHeader(String),

    #[error("auth.redirect_param must not be empty")]
    EmptyRedirectParam,

    #[error("upstream.address {0:?} is not a valid host:port")]
    InvalidUpstream(String),

    #[error("session.auth_url {0:?} is not a valid URL")]
    InvalidAuthUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("admin.api_key must be changed from the placeholder when the admin API is enabled")]
    AdminKeyPlaceholder,
}

/// Two routes from different sets that cover a common path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOverlap {
    pub first_set: &'static str,
    pub first: String,
    pub second_set: &'static str,
    pub second: String,
}

impl std::fmt::Display for RouteOverlap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "routes.{} {:?} overlaps routes.{} {:?}",
            self.first_set, self.first, self.second_set, self.second
        )
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let routes = &config.routes;

    for (set, list) in [
        ("public", &routes.public),
        ("protected", &routes.protected),
        ("api", &routes.api),
        ("excluded", &routes.excluded),
    ] {
        for (i, route) in list.iter().enumerate() {
            if !route.starts_with('/') {
                errors.push(ValidationError::InvalidRoute {
                    set,
                    route: route.clone(),
                });
            }
            if list[..i].contains(route) {
                errors.push(ValidationError::DuplicateRoute {
                    set,
                    route: route.clone(),
                });
            }
        }
    }

    if !routes.webhook_path.is_empty() && !routes.webhook_path.starts_with('/') {
        errors.push(ValidationError::InvalidPath {
            field: "routes.webhook_path",
            path: routes.webhook_path.clone(),
        });
    }

    let auth = &config.auth;
    if !auth.login_path.starts_with('/') {
        errors.push(ValidationError::InvalidPath {
            field: "auth.login_path",
            path: auth.login_path.clone(),
        });
    } else if routes
        .protected
        .iter()
        .any(|route| route_matches(route, &auth.login_path, routes.match_mode))
    {
        // Every login redirect would loop back into itself.
        errors.push(ValidationError::LoginProtected(auth.login_path.clone()));
    }

    if HeaderName::from_str(&auth.api_key_header).is_err() {
        errors.push(ValidationError::InvalidHeader(auth.api_key_header.clone()));
    }

    if auth.redirect_param.is_empty() {
        errors.push(ValidationError::EmptyRedirectParam);
    }

    if Authority::from_str(&config.upstream.address).is_err() {
        errors.push(ValidationError::InvalidUpstream(config.upstream.address.clone()));
    }

    if url::Url::parse(&config.session.auth_url).is_err() {
        errors.push(ValidationError::InvalidAuthUrl(config.session.auth_url.clone()));
    }

    if config.session.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("session.timeout_ms"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }

    if config.admin.enabled && config.admin.api_key == ADMIN_KEY_PLACEHOLDER {
        errors.push(ValidationError::AdminKeyPlaceholder);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Find routes in different sets that cover a common path.
pub fn find_overlaps(config: &GatewayConfig) -> Vec<RouteOverlap> {
    let routes = &config.routes;
    let mode = routes.match_mode;
    let pairs = [
        ("api", &routes.api, "public", &routes.public),
        ("api", &routes.api, "protected", &routes.protected),
        ("public", &routes.public, "protected", &routes.protected),
    ];

    let mut overlaps = Vec::new();
    for (first_set, first, second_set, second) in pairs {
        for a in first {
            for b in second {
                if overlap(a, b, mode) {
                    overlaps.push(RouteOverlap {
                        first_set,
                        first: a.clone(),
                        second_set,
                        second: b.clone(),
                    });
                }
            }
        }
    }
    overlaps
}

fn overlap(a: &str, b: &str, mode: MatchMode) -> bool {
    route_matches(a, b, mode) || route_matches(b, a, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
        assert!(find_overlaps(&GatewayConfig::default()).is_empty());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.routes.public.push("login".into());
        config.routes.api.push("/api/data".into());
        config.auth.api_key_header = "bad header".into();
        config.upstream.address = "not an address/".into();
        config.session.timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::InvalidRoute {
            set: "public",
            route: "login".into()
        }));
        assert!(errors.contains(&ValidationError::DuplicateRoute {
            set: "api",
            route: "/api/data".into()
        }));
        assert!(errors.contains(&ValidationError::InvalidHeader("bad header".into())));
        assert!(errors.contains(&ValidationError::InvalidUpstream("not an address/".into())));
        assert!(errors.contains(&ValidationError::ZeroTimeout("session.timeout_ms")));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_login_inside_protected_set() {
        let mut config = GatewayConfig::default();
        config.routes.protected.push("/log".into());
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::LoginProtected("/login".into())])
        );

        // Segment matching no longer covers the login page.
        config.routes.match_mode = MatchMode::Segment;
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_admin_placeholder_key() {
        let mut config = GatewayConfig::default();
        config.admin.enabled = true;
        assert_eq!(
            validate_config(&config),
            Err(vec![ValidationError::AdminKeyPlaceholder])
        );
        config.admin.api_key = "s3cret".into();
        assert_eq!(validate_config(&config), Ok(()));
    }

    #[test]
    fn test_overlaps_reported() {
        let mut config = GatewayConfig::default();
        config.routes.api.push("/api/webhook".into());
        config.routes.protected.push("/pub".into());

        let overlaps = find_overlaps(&config);
        assert!(overlaps.contains(&RouteOverlap {
            first_set: "api",
            first: "/api/webhook".into(),
            second_set: "public",
            second: "/api/webhook".into(),
        }));
        assert!(overlaps.contains(&RouteOverlap {
            first_set: "public",
            first: "/public".into(),
            second_set: "protected",
            second: "/pub".into(),
        }));
    }
}
