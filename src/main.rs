//! route-gate
//!
//! A gateway that classifies every request path and either forwards it to
//! the upstream application, rejects it, or redirects it to login.
//!
//! ```text
//!     Client ──▶ request id ──▶ trace ──▶ timeout ──▶ access control ──▶ forward ──▶ Upstream
//!                                                       │
//!                                       ┌───────────────┼───────────────┐
//!                                       ▼               ▼               ▼
//!                                   api key?        public /        session
//!                                   401 JSON        webhook         resolver
//!                                                   forward      (auth service)
//!                                                                       │
//!                                                          protected && none → 307 /login
//! ```

use std::path::PathBuf;

use clap::Parser;

use route_gate::config::{self, GatewayConfig};
use route_gate::lifecycle::{self, signals::shutdown_on_signal, Shutdown};
use route_gate::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "route-gate")]
#[command(about = "Route access gateway", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::read_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("route-gate v{} starting", env!("CARGO_PKG_VERSION"));

    let config = config::finalize(config)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        match_mode = ?config.routes.match_mode,
        failure_policy = ?config.session.failure_policy,
        public = config.routes.public.len(),
        protected = config.routes.protected.len(),
        api = config.routes.api.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let running = lifecycle::start(config, &shutdown).await?;
    tracing::info!(
        address = %running.gateway_addr,
        admin = ?running.admin_addr,
        "Listening for connections"
    );

    tokio::spawn(shutdown_on_signal(shutdown.clone()));
    running.wait().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
