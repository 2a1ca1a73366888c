//! Route access gateway library.
//!
//! Classifies request paths as public, protected or API-gated and decides,
//! per request, whether to forward, reject (401) or redirect to login.

pub mod access;
pub mod admin;
pub mod client;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod session;

pub use access::{AccessController, Decision};
pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
