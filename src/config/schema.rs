//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BalancerConfig {
    /// Listener configuration (bind address and port).
    pub listener: ListenerConfig,

    /// Backend host and the ordered list of backend ports.
    pub backends: BackendsConfig,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Periodic status report settings.
    pub stats: StatsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub bind_host: String,

    /// Port clients connect to.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` form used for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Backend server definitions.
///
/// All backends share one host; the order of `ports` is the tie-break order
/// for selection and the sweep order for health checks.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct BackendsConfig {
    /// Host shared by every backend.
    pub host: String,

    /// Ordered backend ports.
    pub ports: Vec<u16>,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            ports: vec![9001, 9002],
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable active health checks.
    pub enabled: bool,

    /// Period between liveness sweeps in milliseconds.
    pub interval_ms: u64,

    /// Upper bound on a single connect probe in milliseconds.
    pub timeout_ms: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 3000,
            timeout_ms: 1000,
        }
    }
}

/// Output format of the periodic status report.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatsFormat {
    #[default]
    Table,
    Json,
}

/// Status report configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct StatsConfig {
    /// Enable the periodic report.
    pub enabled: bool,

    /// Period between snapshots in milliseconds.
    pub interval_ms: u64,

    /// Rendering of each snapshot.
    pub format: StatsFormat,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 5000,
            format: StatsFormat::Table,
        }
    }
}

/// Log line encoding.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line encoding.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
