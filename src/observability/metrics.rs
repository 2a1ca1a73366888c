//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define gateway metrics (decisions, resolver latency and failures)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `gate_decisions_total` (counter): decisions by outcome
//! - `gate_resolver_duration_seconds` (histogram): session lookup latency
//! - `gate_resolver_failures_total` (counter): resolver failures by kind
//! - `gate_upstream_requests_total` (counter): forwarded requests by status
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users
//!   and tests pay nothing
//! - Low-cardinality labels only (no paths)

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(outcome: &'static str) {
    counter!("gate_decisions_total", "outcome" => outcome).increment(1);
}

pub fn record_resolver_duration(start: Instant) {
    histogram!("gate_resolver_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_resolver_failure(kind: &'static str) {
    counter!("gate_resolver_failures_total", "kind" => kind).increment(1);
}

pub fn record_upstream(status: u16) {
    counter!("gate_upstream_requests_total", "status" => status.to_string()).increment(1);
}
