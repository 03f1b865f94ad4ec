//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server (shared host, own port)
//! - Track active connections (for Least Connections LB)
//!
//! Counters are only written through `BackendRegistry`; this type holds the
//! atomics it operates on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::observability::metrics;

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// Host shared by every backend.
    pub host: Arc<str>,
    /// The port identifying this backend.
    pub port: u16,
    /// Number of sessions currently attributed to this backend.
    active_connections: AtomicUsize,
}

impl Backend {
    /// Create a new backend with no load.
    pub fn new(host: Arc<str>, port: u16) -> Self {
        Self {
            host,
            port,
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Get the current number of active connections.
    pub fn load(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Increment active connection count. Returns the new value.
    pub fn inc_connections(&self) -> usize {
        let now = self.active_connections.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::record_backend_load(self.port, now);
        now
    }

    /// Decrement active connection count. Returns the new value.
    ///
    /// The counter never wraps: a decrement at zero is dropped and `None` is
    /// returned. That happens only when a session opened before an outage
    /// finishes after the recovery reset.
    pub fn dec_connections(&self) -> Option<usize> {
        let result = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .ok()
            .map(|prev| prev - 1);

        match result {
            Some(now) => metrics::record_backend_load(self.port, now),
            None => tracing::debug!(port = self.port, "Load already zero, decrement dropped"),
        }
        result
    }

    /// Discard whatever count is stored.
    pub fn reset_connections(&self) {
        self.active_connections.store(0, Ordering::Relaxed);
        metrics::record_backend_load(self.port, 0);
    }

    /// Address tuple used for both routing and probing.
    pub fn target(&self) -> (&str, u16) {
        (&*self.host, self.port)
    }
}
