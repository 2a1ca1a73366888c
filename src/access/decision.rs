//! Access decisions and their HTTP rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{json, Value};
use url::form_urlencoded;

pub const API_KEY_REQUIRED: &str = "API key required";
pub const SESSION_UNAVAILABLE: &str = "session service unavailable";

/// The single outcome produced for each request.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Pass the request through untouched.
    Forward,
    /// Answer with a JSON error body.
    Reject { status: StatusCode, body: Value },
    /// Send the client elsewhere, carrying query parameters.
    Redirect {
        target: String,
        query: Vec<(String, String)>,
    },
}

impl Decision {
    pub fn api_key_required() -> Self {
        Decision::Reject {
            status: StatusCode::UNAUTHORIZED,
            body: json!({ "error": API_KEY_REQUIRED }),
        }
    }

    pub fn session_unavailable() -> Self {
        Decision::Reject {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: json!({ "error": SESSION_UNAVAILABLE }),
        }
    }

    pub fn login_redirect(login_path: &str, param: &str, original_path: &str) -> Self {
        Decision::Redirect {
            target: login_path.to_string(),
            query: vec![(param.to_string(), original_path.to_string())],
        }
    }

    /// Label used in logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Decision::Forward => "forward",
            Decision::Reject { .. } => "reject",
            Decision::Redirect { .. } => "redirect",
        }
    }

    /// `Location` value for a redirect.
    ///
    /// Values are form-urlencoded, except that `/` is kept as-is so the
    /// returned path stays readable: `/login?redirect=/dashboard`.
    pub fn location(&self) -> Option<String> {
        let Decision::Redirect { target, query } = self else {
            return None;
        };
        if query.is_empty() {
            return Some(target.clone());
        }
        let pairs = query
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&");
        Some(format!("{target}?{pairs}"))
    }

    /// JSON view for the admin API.
    pub fn to_json(&self) -> Value {
        match self {
            Decision::Forward => json!({ "outcome": "forward" }),
            Decision::Reject { status, body } => json!({
                "outcome": "reject",
                "status": status.as_u16(),
                "body": body,
            }),
            Decision::Redirect { .. } => json!({
                "outcome": "redirect",
                "location": self.location(),
            }),
        }
    }

    /// Render a terminal decision. `Forward` has no response of its own.
    pub fn into_response(self) -> Option<Response> {
        match self {
            Decision::Forward => None,
            Decision::Reject { status, body } => {
                // Json sets Content-Type: application/json.
                Some((status, Json(body)).into_response())
            }
            Decision::Redirect { .. } => {
                let location = self.location().unwrap_or_default();
                Some(Redirect::temporary(&location).into_response())
            }
        }
    }
}

fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace("%2F", "/")
}
