//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals > 0, ports valid)
//! - Reject duplicate backend ports (the port is the backend's identity)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::BalancerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backends.ports must not be empty")]
    NoBackends,

    #[error("backends.ports contains port 0")]
    ZeroBackendPort,

    #[error("backends.ports lists port {0} more than once")]
    DuplicateBackendPort(u16),

    #[error("backends.host must not be empty")]
    EmptyBackendHost,

    #[error("listener.bind_host must not be empty")]
    EmptyBindHost,

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("observability.metrics_address is not a socket address: {0}")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_host.trim().is_empty() {
        errors.push(ValidationError::EmptyBindHost);
    }

    if config.backends.host.trim().is_empty() {
        errors.push(ValidationError::EmptyBackendHost);
    }

    if config.backends.ports.is_empty() {
        errors.push(ValidationError::NoBackends);
    }

    let mut seen = HashSet::new();
    for &port in &config.backends.ports {
        if port == 0 {
            errors.push(ValidationError::ZeroBackendPort);
        } else if !seen.insert(port) {
            errors.push(ValidationError::DuplicateBackendPort(port));
        }
    }

    if config.health_check.interval_ms == 0 {
        errors.push(ValidationError::ZeroDuration { field: "health_check.interval_ms" });
    }
    if config.health_check.timeout_ms == 0 {
        errors.push(ValidationError::ZeroDuration { field: "health_check.timeout_ms" });
    }
    if config.stats.interval_ms == 0 {
        errors.push(ValidationError::ZeroDuration { field: "stats.interval_ms" });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
