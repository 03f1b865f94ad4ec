//! Error types shared across the balancer.

use std::io;
use thiserror::Error;

/// Result type for balancer operations.
pub type Result<T> = std::result::Result<T, BalancerError>;

/// Errors raised on the routing path.
///
/// None of these escape the task they occur in: each one is handled where it
/// happens (client closed, attempt logged) and the process keeps running.
#[derive(Debug, Error)]
pub enum BalancerError {
    /// The live set is empty.
    #[error("Service unavailable: no live backend")]
    NoLiveBackend,

    /// A port that is not part of the configured backend set.
    #[error("Unknown backend port: {0}")]
    UnknownBackend(u16),

    /// Connecting to the selected backend failed.
    #[error("Failed to connect to backend on port {port}: {source}")]
    BackendConnect {
        port: u16,
        #[source]
        source: io::Error,
    },
}

impl BalancerError {
    /// Label used for the rejection counter.
    pub fn reason(&self) -> &'static str {
        match self {
            BalancerError::NoLiveBackend => "no_live_backend",
            BalancerError::UnknownBackend(_) => "unknown_backend",
            BalancerError::BackendConnect { .. } => "backend_connect",
        }
    }
}
