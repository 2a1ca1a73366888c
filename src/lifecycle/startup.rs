//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the session resolver and access controller
//! - Bind the gateway and admin listeners
//! - Spawn the servers, each subscribed to the shutdown signal
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listeners bind before anything is spawned, so a bad address never
//!   leaves a half-started process

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::access::AccessController;
use crate::admin::{self, AdminState};
use crate::config::GatewayConfig;
use crate::http::{GatewayServer, ServerError};
use crate::lifecycle::Shutdown;
use crate::session::{HttpSessionResolver, ResolverError, SessionResolver};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("session resolver: {0}")]
    Resolver(#[from] ResolverError),

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server task panicked")]
    Join,
}

/// Handles to the spawned servers.
pub struct Running {
    pub gateway_addr: SocketAddr,
    pub admin_addr: Option<SocketAddr>,
    tasks: Vec<JoinHandle<Result<(), std::io::Error>>>,
}

impl Running {
    /// Wait for every server to stop.
    pub async fn wait(self) -> Result<(), StartupError> {
        for task in self.tasks {
            task.await.map_err(|_| StartupError::Join)??;
        }
        Ok(())
    }
}

/// Start with the HTTP session resolver described by the config.
pub async fn start(config: GatewayConfig, shutdown: &Shutdown) -> Result<Running, StartupError> {
    let resolver = Arc::new(HttpSessionResolver::new(&config.session)?);
    start_with_resolver(config, resolver, shutdown).await
}

/// Start with a caller-supplied session resolver.
pub async fn start_with_resolver(
    config: GatewayConfig,
    resolver: Arc<dyn SessionResolver>,
    shutdown: &Shutdown,
) -> Result<Running, StartupError> {
    let controller =
        Arc::new(AccessController::from_config(&config, resolver).map_err(ServerError::from)?);

    let gateway_listener = bind(&config.listener.bind_address).await?;
    let gateway_addr = gateway_listener.local_addr()?;

    let admin_listener = if config.admin.enabled {
        Some(bind(&config.admin.bind_address).await?)
    } else {
        None
    };
    let admin_addr = admin_listener
        .as_ref()
        .map(TcpListener::local_addr)
        .transpose()?;

    let admin_key = config.admin.api_key.clone();
    let server = GatewayServer::with_controller(config, controller.clone())?;

    let mut tasks = Vec::new();
    let server_shutdown = shutdown.subscribe();
    tasks.push(tokio::spawn(server.run(gateway_listener, server_shutdown)));

    if let Some(listener) = admin_listener {
        let state = AdminState::new(controller, &admin_key);
        tasks.push(tokio::spawn(admin::serve(listener, state, shutdown.subscribe())));
    }

    Ok(Running {
        gateway_addr,
        admin_addr,
        tasks,
    })
}

async fn bind(addr: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(addr).await.map_err(|source| StartupError::Bind {
        addr: addr.to_string(),
        source,
    })
}
