//! Route access controller.
//!
//! # Responsibilities
//! - Produce exactly one [`Decision`] per request
//! - Apply the rules in order, first match wins:
//!   1. API-gated path without a key → 401
//!   2. public path → forward
//!   3. webhook path → forward
//!   4. resolve the session
//!   5. protected path without a session → redirect to login
//!   6. otherwise → forward
//!
//! # Design Decisions
//! - Stateless: rules are shared read-only, sessions are never cached
//! - The resolver call is the only suspension point
//! - Resolver failures follow the configured [`FailurePolicy`]

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName};

use crate::access::api_key::{ApiKeyValidator, HeaderPresence};
use crate::access::decision::Decision;
use crate::access::rules::RouteRules;
use crate::config::validation::ValidationError;
use crate::config::{AuthConfig, FailurePolicy, GatewayConfig};
use crate::observability::metrics;
use crate::session::{Credentials, SessionResolver};

/// Request data the controller needs.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub path: &'a str,
    pub headers: &'a HeaderMap,
}

/// Evaluates requests against the route rules.
pub struct AccessController {
    rules: Arc<RouteRules>,
    resolver: Arc<dyn SessionResolver>,
    api_keys: Arc<dyn ApiKeyValidator>,
    login_path: String,
    redirect_param: String,
    failure_policy: FailurePolicy,
}

impl AccessController {
    pub fn new(
        rules: Arc<RouteRules>,
        resolver: Arc<dyn SessionResolver>,
        api_keys: Arc<dyn ApiKeyValidator>,
        auth: &AuthConfig,
        failure_policy: FailurePolicy,
    ) -> Self {
        Self {
            rules,
            resolver,
            api_keys,
            login_path: auth.login_path.clone(),
            redirect_param: auth.redirect_param.clone(),
            failure_policy,
        }
    }

    /// Build a controller from config with a header-presence key check.
    pub fn from_config(
        config: &GatewayConfig,
        resolver: Arc<dyn SessionResolver>,
    ) -> Result<Self, ValidationError> {
        let header = HeaderName::from_bytes(config.auth.api_key_header.as_bytes())
            .map_err(|_| ValidationError::InvalidHeader(config.auth.api_key_header.clone()))?;

        Ok(Self::new(
            Arc::new(RouteRules::from_config(&config.routes)),
            resolver,
            Arc::new(HeaderPresence::new(header)),
            &config.auth,
            config.session.failure_policy,
        ))
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Full evaluation, resolving the session when the rules require it.
    pub async fn decide(&self, req: AccessRequest<'_>) -> Decision {
        let has_key = self.api_keys.has_api_key(req.headers);
        if let Some(decision) = self.pre_session(req.path, has_key) {
            return decision;
        }

        let credentials = Credentials::from_headers(req.headers);
        let has_session = match self.resolver.resolve(&credentials).await {
            Ok(session) => session.is_some(),
            Err(e) => {
                metrics::record_resolver_failure(e.kind());
                match self.failure_policy {
                    FailurePolicy::FailClosed => {
                        tracing::warn!(path = %req.path, error = %e, "Session resolver failed; treating as no session");
                        false
                    }
                    FailurePolicy::FailOpen => {
                        tracing::warn!(path = %req.path, error = %e, "Session resolver failed; treating as authenticated");
                        true
                    }
                    FailurePolicy::ServerError => {
                        tracing::error!(path = %req.path, error = %e, "Session resolver failed");
                        return Decision::session_unavailable();
                    }
                }
            }
        };

        self.post_session(req.path, has_session)
    }

    /// Rules 1–3. `None` means the session must be resolved.
    pub fn pre_session(&self, path: &str, has_api_key: bool) -> Option<Decision> {
        if self.rules.is_api_gated(path) && !has_api_key {
            return Some(Decision::api_key_required());
        }
        if self.rules.is_public(path) || self.rules.is_webhook(path) {
            return Some(Decision::Forward);
        }
        None
    }

    /// Rules 5–6.
    pub fn post_session(&self, path: &str, has_session: bool) -> Decision {
        if self.rules.is_protected(path) && !has_session {
            return Decision::login_redirect(&self.login_path, &self.redirect_param, path);
        }
        Decision::Forward
    }

    /// Decision for a hypothetical request, without calling the resolver.
    pub fn preview(&self, path: &str, has_api_key: bool, has_session: bool) -> Decision {
        self.pre_session(path, has_api_key)
            .unwrap_or_else(|| self.post_session(path, has_session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatchMode;
    use crate::session::{ResolverError, Session};
    use async_trait::async_trait;
    use axum::http::{HeaderValue, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolver returning a fixed answer and counting calls.
    struct FixedResolver {
        answer: fn() -> Result<Option<Session>, ResolverError>,
        calls: AtomicUsize,
    }

    impl FixedResolver {
        fn new(answer: fn() -> Result<Option<Session>, ResolverError>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SessionResolver for FixedResolver {
        async fn resolve(&self, _credentials: &Credentials) -> Result<Option<Session>, ResolverError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }
    }

    fn present() -> Result<Option<Session>, ResolverError> {
        Ok(Some(Session {
            user_id: "user-1".into(),
            email: None,
        }))
    }

    fn absent() -> Result<Option<Session>, ResolverError> {
        Ok(None)
    }

    fn failing() -> Result<Option<Session>, ResolverError> {
        Err(ResolverError::Timeout(3000))
    }

    fn controller(config: &GatewayConfig, resolver: Arc<FixedResolver>) -> AccessController {
        AccessController::from_config(config, resolver).unwrap()
    }

    async fn decide(c: &AccessController, path: &str, headers: &HeaderMap) -> Decision {
        c.decide(AccessRequest { path, headers }).await
    }

    fn with_key() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("abc123"));
        headers
    }

    #[tokio::test]
    async fn test_protected_without_session_redirects() {
        let c = controller(&GatewayConfig::default(), FixedResolver::new(absent));
        let d = decide(&c, "/dashboard", &HeaderMap::new()).await;
        assert_eq!(d.location().as_deref(), Some("/login?redirect=/dashboard"));
    }

    #[tokio::test]
    async fn test_protected_with_session_forwards() {
        let c = controller(&GatewayConfig::default(), FixedResolver::new(present));
        assert_eq!(decide(&c, "/dashboard", &HeaderMap::new()).await, Decision::Forward);
        assert_eq!(decide(&c, "/profile/edit", &HeaderMap::new()).await, Decision::Forward);
    }

    #[tokio::test]
    async fn test_api_route_requires_key_regardless_of_session() {
        let answers: [fn() -> Result<Option<Session>, ResolverError>; 3] = [present, absent, failing];
        for answer in answers {
            let resolver = FixedResolver::new(answer);
            let c = controller(&GatewayConfig::default(), resolver.clone());
            assert_eq!(
                decide(&c, "/api/data", &HeaderMap::new()).await,
                Decision::api_key_required()
            );
            assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_api_route_with_key_forwards() {
        let c = controller(&GatewayConfig::default(), FixedResolver::new(absent));
        assert_eq!(decide(&c, "/api/data", &with_key()).await, Decision::Forward);
    }

    #[tokio::test]
    async fn test_public_paths_skip_resolver() {
        let resolver = FixedResolver::new(failing);
        let c = controller(&GatewayConfig::default(), resolver.clone());

        for path in ["/", "/login", "/register/step-2", "/public/logo.svg", "/api/webhook/stripe"] {
            assert_eq!(decide(&c, path, &HeaderMap::new()).await, Decision::Forward, "{path}");
        }
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_webhook_forwards_without_public_entry() {
        let mut config = GatewayConfig::default();
        config.routes.public.retain(|r| r != "/api/webhook");
        let resolver = FixedResolver::new(absent);
        let c = controller(&config, resolver.clone());

        assert_eq!(decide(&c, "/api/webhook/stripe", &HeaderMap::new()).await, Decision::Forward);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_api_gating_precedes_webhook() {
        let mut config = GatewayConfig::default();
        config.routes.api.push("/api/webhook".into());
        let c = controller(&config, FixedResolver::new(present));

        assert_eq!(
            decide(&c, "/api/webhook/stripe", &HeaderMap::new()).await,
            Decision::api_key_required()
        );
        assert_eq!(decide(&c, "/api/webhook/stripe", &with_key()).await, Decision::Forward);
    }

    #[tokio::test]
    async fn test_unclassified_path_forwards_after_resolving() {
        let resolver = FixedResolver::new(absent);
        let c = controller(&GatewayConfig::default(), resolver.clone());
        assert_eq!(decide(&c, "/about", &HeaderMap::new()).await, Decision::Forward);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_policies() {
        let mut config = GatewayConfig::default();

        config.session.failure_policy = FailurePolicy::FailClosed;
        let c = controller(&config, FixedResolver::new(failing));
        assert!(matches!(
            decide(&c, "/dashboard", &HeaderMap::new()).await,
            Decision::Redirect { .. }
        ));

        config.session.failure_policy = FailurePolicy::FailOpen;
        let c = controller(&config, FixedResolver::new(failing));
        assert_eq!(decide(&c, "/dashboard", &HeaderMap::new()).await, Decision::Forward);

        config.session.failure_policy = FailurePolicy::ServerError;
        let c = controller(&config, FixedResolver::new(failing));
        match decide(&c, "/dashboard", &HeaderMap::new()).await {
            Decision::Reject { status, .. } => assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE),
            other => panic!("expected reject, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_decision_is_idempotent() {
        let resolver = FixedResolver::new(absent);
        let c = controller(&GatewayConfig::default(), resolver.clone());
        let first = decide(&c, "/profile", &HeaderMap::new()).await;
        let second = decide(&c, "/profile", &HeaderMap::new()).await;
        assert_eq!(first, second);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_raw_prefix_hazard_reaches_decisions() {
        let mut config = GatewayConfig::default();
        config.routes.protected = vec!["/pro".into()];
        let c = controller(&config, FixedResolver::new(absent));
        assert!(matches!(
            decide(&c, "/products", &HeaderMap::new()).await,
            Decision::Redirect { .. }
        ));

        config.routes.match_mode = MatchMode::Segment;
        let c = controller(&config, FixedResolver::new(absent));
        assert_eq!(decide(&c, "/products", &HeaderMap::new()).await, Decision::Forward);
    }

    #[test]
    fn test_preview_matches_rules() {
        let c = controller(&GatewayConfig::default(), FixedResolver::new(absent));
        assert_eq!(c.preview("/api/integration", false, true), Decision::api_key_required());
        assert_eq!(c.preview("/dashboard", false, true), Decision::Forward);
        assert!(matches!(c.preview("/dashboard", false, false), Decision::Redirect { .. }));
    }

    #[test]
    fn test_invalid_api_key_header_is_rejected() {
        let mut config = GatewayConfig::default();
        config.auth.api_key_header = "bad header".into();

        let result = AccessController::from_config(&config, FixedResolver::new(absent));
        assert!(matches!(
            result,
            Err(ValidationError::InvalidHeader(header)) if header == "bad header"
        ));
    }
}
