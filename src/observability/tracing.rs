//! Request spans.
//!
//! # Responsibilities
//! - Create one span per request carrying the request ID
//!
//! # Design Decisions
//! - The request ID is assigned before the trace layer runs, so every log
//!   line inside the request is correlated

use axum::{body::Body, http::Request};
use tracing::Span;

use crate::http::request::request_id;

/// Span factory for `TraceLayer::make_span_with`.
pub fn request_span(req: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id(req.headers()),
    )
}
