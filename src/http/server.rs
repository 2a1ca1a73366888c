//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the forward handler
//! - Wire up middleware (access control, limits, timeout, tracing, request ID)
//! - Bind server to listener
//! - Forward allowed requests to the upstream application

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{
        uri::{Authority, PathAndQuery, Scheme},
        HeaderValue, Request, StatusCode, Uri, Version,
    },
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::access::AccessController;
use crate::config::validation::ValidationError;
use crate::config::GatewayConfig;
use crate::http::middleware::access_control_middleware;
use crate::http::request::{
    propagate_request_id_layer, request_id, set_request_id_layer, X_REQUEST_ID,
};
use crate::http::response::strip_hop_by_hop;
use crate::observability::{metrics, tracing::request_span};
use crate::session::SessionResolver;

/// Errors raised while assembling the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid upstream address {0:?}")]
    InvalidUpstream(String),

    #[error(transparent)]
    Config(#[from] ValidationError),
}

/// Application state injected into the forward handler.
#[derive(Clone)]
pub struct AppState {
    pub client: Client<HttpConnector, Body>,
    pub upstream: Authority,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: Arc<GatewayConfig>,
    controller: Arc<AccessController>,
}

impl GatewayServer {
    /// Create a new server from validated config and a session resolver.
    pub fn new(
        config: GatewayConfig,
        resolver: Arc<dyn SessionResolver>,
    ) -> Result<Self, ServerError> {
        let controller = Arc::new(AccessController::from_config(&config, resolver)?);
        Self::with_controller(config, controller)
    }

    /// Create a new server around an already built controller.
    pub fn with_controller(
        config: GatewayConfig,
        controller: Arc<AccessController>,
    ) -> Result<Self, ServerError> {
        let upstream = Authority::from_str(&config.upstream.address)
            .map_err(|_| ServerError::InvalidUpstream(config.upstream.address.clone()))?;

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState { client, upstream };
        let router = Self::build_router(&config, state, controller.clone());

        Ok(Self {
            router,
            config: Arc::new(config),
            controller,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &GatewayConfig,
        state: AppState,
        controller: Arc<AccessController>,
    ) -> Router {
        Router::new()
            .route("/", any(forward_handler))
            .route("/{*path}", any(forward_handler))
            .with_state(state)
            .layer(middleware::from_fn_with_state(
                controller,
                access_control_middleware,
            ))
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.address,
            "Gateway server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("Gateway server stopped");
        Ok(())
    }

    /// The assembled router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn controller(&self) -> Arc<AccessController> {
        self.controller.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Forwards an allowed request to the upstream and streams the answer back.
async fn forward_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let request_id = request_id(request.headers()).to_string();
    let (mut parts, body) = request.into_parts();

    // URI rewrite
    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(state.upstream.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    parts.uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Cannot build upstream URI");
            return (StatusCode::BAD_REQUEST, "Invalid request URI").into_response();
        }
    };
    parts.version = Version::HTTP_11;
    strip_hop_by_hop(&mut parts.headers);
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(X_REQUEST_ID, value);
    }

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            metrics::record_upstream(response.status().as_u16());
            let (mut parts, body) = response.into_parts();
            strip_hop_by_hop(&mut parts.headers);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Upstream error");
            metrics::record_upstream(StatusCode::BAD_GATEWAY.as_u16());
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
