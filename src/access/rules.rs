//! Route classification rule sets.
//!
//! # Responsibilities
//! - Hold the public, protected and API-gated route sets
//! - Test a request path for membership in each set
//! - Recognize the webhook path and excluded static-asset prefixes
//!
//! # Design Decisions
//! - Built once from config, immutable afterwards, shared via `Arc`
//! - Path matching is case-sensitive
//! - The root route `/` matches only the root path, in every mode
//! - No regex: O(n) scan over each set

use serde::Serialize;

use crate::config::schema::{MatchMode, RoutesConfig};

/// Returns true if `path` falls under `route` with the given mode.
///
/// In [`MatchMode::Prefix`] this is a raw string prefix test, so a route
/// `/pro` also covers `/profile`. [`MatchMode::Segment`] requires the match
/// to end at a `/` boundary.
pub fn route_matches(route: &str, path: &str, mode: MatchMode) -> bool {
    if route == "/" {
        return path == "/";
    }
    if path == route {
        return true;
    }
    match mode {
        MatchMode::Prefix => path.starts_with(route),
        MatchMode::Segment => match path.strip_prefix(route) {
            Some(rest) => route.ends_with('/') || rest.starts_with('/'),
            None => false,
        },
    }
}

/// An ordered set of route prefixes.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct RouteSet {
    routes: Vec<String>,
}

impl RouteSet {
    pub fn new<I, S>(routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            routes: routes.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the first route covering `path`, if any.
    pub fn find(&self, path: &str, mode: MatchMode) -> Option<&str> {
        self.routes
            .iter()
            .map(String::as_str)
            .find(|route| route_matches(route, path, mode))
    }

    pub fn contains(&self, path: &str, mode: MatchMode) -> bool {
        self.find(path, mode).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Which rule sets a path belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouteMembership {
    pub excluded: bool,
    pub api_gated: bool,
    pub public: bool,
    pub webhook: bool,
    pub protected: bool,
}

/// Compiled, immutable route rules.
#[derive(Debug, Clone, Serialize)]
pub struct RouteRules {
    public: RouteSet,
    protected: RouteSet,
    api_gated: RouteSet,
    webhook_path: String,
    excluded: Vec<String>,
    match_mode: MatchMode,
}

impl RouteRules {
    pub fn from_config(config: &RoutesConfig) -> Self {
        Self {
            public: RouteSet::new(config.public.iter().cloned()),
            protected: RouteSet::new(config.protected.iter().cloned()),
            api_gated: RouteSet::new(config.api.iter().cloned()),
            webhook_path: config.webhook_path.clone(),
            excluded: config.excluded.clone(),
            match_mode: config.match_mode,
        }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.public.contains(path, self.match_mode)
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.contains(path, self.match_mode)
    }

    pub fn is_api_gated(&self, path: &str) -> bool {
        self.api_gated.contains(path, self.match_mode)
    }

    /// Webhook path or anything below it. An empty webhook path disables
    /// the exemption.
    pub fn is_webhook(&self, path: &str) -> bool {
        !self.webhook_path.is_empty() && route_matches(&self.webhook_path, path, self.match_mode)
    }

    /// Static assets are skipped before classification, always by raw prefix.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn membership(&self, path: &str) -> RouteMembership {
        RouteMembership {
            excluded: self.is_excluded(path),
            api_gated: self.is_api_gated(path),
            public: self.is_public(path),
            webhook: self.is_webhook(path),
            protected: self.is_protected(path),
        }
    }

    pub fn public(&self) -> &RouteSet {
        &self.public
    }

    pub fn protected(&self) -> &RouteSet {
        &self.protected
    }

    pub fn api_gated(&self) -> &RouteSet {
        &self.api_gated
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }
}
