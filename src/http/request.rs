//! Request identification.
//!
//! # Responsibilities
//! - Assign a UUID request ID to every request lacking one
//! - Echo the request ID on the response
//! - Expose the ID to handlers and spans
//! - Resolve `.` and `..` path segments before anything inspects the path
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - A client-supplied `x-request-id` is kept, so IDs survive chained proxies
//! - Dot segments are resolved the way browsers do, including their
//!   percent-encoded forms, so `/public/../dashboard` is `/dashboard`

use std::borrow::Cow;

use axum::http::{uri::PathAndQuery, HeaderMap, HeaderName, Uri};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Layer assigning request IDs.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Layer copying the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

/// The request ID, or `"unknown"` when none was assigned.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

fn is_single_dot(segment: &str) -> bool {
    segment == "." || segment.eq_ignore_ascii_case("%2e")
}

fn is_double_dot(segment: &str) -> bool {
    if !(2..=6).contains(&segment.len()) {
        return false;
    }
    matches!(
        segment.to_ascii_lowercase().as_str(),
        ".." | ".%2e" | "%2e." | "%2e%2e"
    )
}

/// Resolve dot segments in an absolute path.
///
/// Returns the input unchanged when it has none. `..` never climbs above
/// the root, and a trailing dot segment leaves a trailing slash.
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    let Some(rest) = path.strip_prefix('/') else {
        return Cow::Borrowed(path);
    };
    if !rest
        .split('/')
        .any(|s| is_single_dot(s) || is_double_dot(s))
    {
        return Cow::Borrowed(path);
    }

    let segments: Vec<&str> = rest.split('/').collect();
    let last = segments.len() - 1;
    let mut out: Vec<&str> = Vec::with_capacity(segments.len());
    for (i, segment) in segments.into_iter().enumerate() {
        let dot = if is_double_dot(segment) {
            out.pop();
            true
        } else {
            is_single_dot(segment)
        };
        if !dot {
            out.push(segment);
        } else if i == last {
            out.push("");
        }
    }
    Cow::Owned(format!("/{}", out.join("/")))
}

/// The same URI with its path replaced, query kept.
pub fn with_path(uri: &Uri, path: &str) -> Option<Uri> {
    let path_and_query = match uri.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(parts).ok()
}
