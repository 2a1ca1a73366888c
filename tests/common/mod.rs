//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;

use route_gate::config::GatewayConfig;

pub const VALID_TOKEN: &str = "valid-token";
pub const ERROR_TOKEN: &str = "error-token";
pub const SLOW_TOKEN: &str = "slow-token";

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Upstream that echoes the path, query and selected headers as JSON.
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(uri: Uri, headers: HeaderMap) -> impl IntoResponse {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Json(json!({
            "upstream": true,
            "path": uri.path(),
            "query": uri.query(),
            "x-request-id": header("x-request-id"),
            "x-api-key": header("x-api-key"),
        }))
    }

    spawn(Router::new().route("/", any(echo)).route("/{*path}", any(echo))).await
}

/// Mock hosted auth service serving `GET /auth/v1/user`.
///
/// Bearer `valid-token` → 200, `error-token` → 500, `slow-token` → 200
/// after two seconds, anything else → 401. Counts every call.
pub async fn start_mock_auth() -> (SocketAddr, Arc<AtomicUsize>) {
    async fn user(State(calls): State<Arc<AtomicUsize>>, headers: HeaderMap) -> impl IntoResponse {
        calls.fetch_add(1, Ordering::SeqCst);

        if headers.get("apikey").and_then(|v| v.to_str().ok()) != Some("anon-key") {
            return (StatusCode::BAD_REQUEST, Json(json!({ "msg": "missing apikey" })));
        }

        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or_default();

        match token {
            VALID_TOKEN => (
                StatusCode::OK,
                Json(json!({ "id": "user-1", "email": "user@example.com" })),
            ),
            ERROR_TOKEN => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "msg": "boom" })),
            ),
            SLOW_TOKEN => {
                tokio::time::sleep(Duration::from_secs(2)).await;
                (StatusCode::OK, Json(json!({ "id": "user-slow" })))
            }
            _ => (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "invalid JWT" }))),
        }
    }

    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/auth/v1/user", get(user))
        .with_state(calls.clone());
    (spawn(app).await, calls)
}

/// Config pointing at the given upstream and auth service, on ephemeral ports.
pub fn test_config(upstream: SocketAddr, auth: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.address = upstream.to_string();
    config.session.auth_url = format!("http://{auth}");
    config.session.anon_key = "anon-key".into();
    config.session.timeout_ms = 500;
    config.admin.bind_address = "127.0.0.1:0".into();
    config
}

/// Client that reports redirects instead of following them.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
