//! Access Control Middleware.
//! Runs the route access controller in front of every handler.
//!
//! Layer it with `axum::middleware::from_fn_with_state(controller, access_control_middleware)`.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::access::{AccessController, AccessRequest};
use crate::http::request::{normalize_path, request_id, with_path};
use crate::observability::metrics;

pub async fn access_control_middleware(
    State(controller): State<Arc<AccessController>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // 1. Classify and forward the resolved path, never the raw one.
    let normalized = match normalize_path(req.uri().path()) {
        Cow::Owned(path) => Some(path),
        Cow::Borrowed(_) => None,
    };
    if let Some(normalized) = normalized {
        match with_path(req.uri(), &normalized) {
            Some(uri) => *req.uri_mut() = uri,
            None => return (StatusCode::BAD_REQUEST, "Invalid request path").into_response(),
        }
    }

    let path = req.uri().path();
    let headers = req.headers();

    // 2. Static assets never reach the controller.
    if controller.rules().is_excluded(path) {
        return next.run(req).await;
    }

    // 3. Evaluate
    let decision = controller.decide(AccessRequest { path, headers }).await;

    metrics::record_decision(decision.outcome());
    tracing::debug!(
        request_id = %request_id(headers),
        path = %path,
        outcome = decision.outcome(),
        "Access decision"
    );

    // 4. Act on it
    match decision.into_response() {
        Some(response) => response,
        None => next.run(req).await,
    }
}
