//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define balancer metrics (sessions, rejections, bytes, backend state)
//! - Expose Prometheus-compatible metrics endpoint
//! - Track per-backend and aggregate metrics
//!
//! # Metrics
//! - `balancer_backend_up` (gauge): 1=live, 0=down, by port
//! - `balancer_backend_active_connections` (gauge): load, by port
//! - `balancer_sessions_total` (counter): sessions routed, by port
//! - `balancer_rejected_total` (counter): clients closed without a session, by reason
//! - `balancer_bytes_total` (counter): bytes forwarded, by direction
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op
//! - Labels are low-cardinality (port, reason, direction)

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP scrape listener.
///
/// Must run inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_backend_health(port: u16, live: bool) {
    gauge!("balancer_backend_up", "port" => port.to_string()).set(if live { 1.0 } else { 0.0 });
}

pub fn record_backend_load(port: u16, load: usize) {
    gauge!("balancer_backend_active_connections", "port" => port.to_string()).set(load as f64);
}

pub fn record_session_opened(port: u16) {
    counter!("balancer_sessions_total", "port" => port.to_string()).increment(1);
}

pub fn record_rejected(reason: &'static str) {
    counter!("balancer_rejected_total", "reason" => reason).increment(1);
}

pub fn record_bytes(direction: &'static str, bytes: u64) {
    counter!("balancer_bytes_total", "direction" => direction).increment(bytes);
}
