//! Backend registry: the shared routing state.
//!
//! # Responsibilities
//! - Own the configured backend set (fixed order, never changes)
//! - Own the live set (which backends may receive new sessions)
//! - Expose load accounting and least-connections selection
//!
//! # Design Decisions
//! - Injected via `Arc` into the dispatcher, health monitor, and stats reporter
//! - Live set is a `DashSet`; insert/remove report whether membership changed,
//!   so each up/down transition is a single atomic operation
//! - Per-backend counters are atomics; there is no registry-wide lock
//! - Selection may observe a racing update; least-connections is a heuristic

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashSet;
use serde::Serialize;

use crate::config::BackendsConfig;
use crate::error::{BalancerError, Result};
use crate::health::state::HealthState;
use crate::load_balancer::{backend::Backend, least_conn::LeastConnections, LoadBalancer};
use crate::observability::metrics;

/// Point-in-time view of one backend, for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendSnapshot {
    pub port: u16,
    pub state: HealthState,
    pub active_connections: usize,
}

/// One session's unit of load on a backend.
///
/// Obtained from [`BackendRegistry::acquire`]; dropping it gives the unit back
/// through [`BackendRegistry::decrement_load`]. Moving it into the
/// response-direction task ties the release to that task ending, whether it
/// ends by EOF, I/O error, or panic.
pub struct LoadGuard {
    registry: Arc<BackendRegistry>,
    port: u16,
}

impl LoadGuard {
    /// The backend port this guard charges.
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl std::fmt::Debug for LoadGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadGuard").field("port", &self.port).finish()
    }
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        // the port was resolved when the guard was issued
        let _ = self.registry.decrement_load(self.port);
    }
}

/// Concurrent store of backend liveness and load.
#[derive(Debug)]
pub struct BackendRegistry {
    /// Every configured backend, in configuration order.
    backends: Vec<Arc<Backend>>,
    /// Port -> position in `backends`.
    index: HashMap<u16, usize>,
    /// Ports currently eligible for routing.
    live: DashSet<u16>,
    /// Selection strategy applied to the live backends.
    balancer: Box<dyn LoadBalancer>,
}

impl BackendRegistry {
    /// Build a registry where every backend starts live with zero load.
    pub fn new(host: &str, ports: &[u16]) -> Self {
        let host: Arc<str> = Arc::from(host);
        let mut backends = Vec::with_capacity(ports.len());
        let mut index = HashMap::with_capacity(ports.len());
        let live = DashSet::with_capacity(ports.len());

        for &port in ports {
            if index.contains_key(&port) {
                tracing::warn!(port, "Duplicate backend port ignored");
                continue;
            }
            index.insert(port, backends.len());
            backends.push(Arc::new(Backend::new(host.clone(), port)));
            live.insert(port);
            metrics::record_backend_health(port, true);
        }

        Self {
            backends,
            index,
            live,
            balancer: Box::new(LeastConnections::new()),
        }
    }

    /// Build a registry from the `[backends]` section.
    pub fn from_config(config: &BackendsConfig) -> Self {
        Self::new(&config.host, &config.ports)
    }

    fn lookup(&self, port: u16) -> Result<&Arc<Backend>> {
        self.index
            .get(&port)
            .map(|&i| &self.backends[i])
            .ok_or(BalancerError::UnknownBackend(port))
    }

    /// Pick the live backend with the fewest active connections.
    ///
    /// Ties go to the backend listed first in the configuration. Fails with
    /// [`BalancerError::NoLiveBackend`] when nothing is live.
    pub fn select_backend(&self) -> Result<Arc<Backend>> {
        let candidates: Vec<Arc<Backend>> = self
            .backends
            .iter()
            .filter(|b| self.live.contains(&b.port))
            .cloned()
            .collect();

        self.balancer
            .next_server(&candidates)
            .ok_or(BalancerError::NoLiveBackend)
    }

    /// Charge one session to `port`. The returned guard releases it on drop.
    pub fn acquire(self: &Arc<Self>, port: u16) -> Result<LoadGuard> {
        self.increment_load(port)?;
        Ok(LoadGuard {
            registry: Arc::clone(self),
            port,
        })
    }

    /// Atomically add one to `port`'s load. Returns the new load.
    pub fn increment_load(&self, port: u16) -> Result<usize> {
        Ok(self.lookup(port)?.inc_connections())
    }

    /// Atomically subtract one from `port`'s load. Returns the load after the
    /// call; a decrement at zero leaves it at zero.
    pub fn decrement_load(&self, port: u16) -> Result<usize> {
        Ok(self.lookup(port)?.dec_connections().unwrap_or(0))
    }

    /// Put `port` back into rotation.
    ///
    /// Returns `true` on a down-to-live transition, in which case the load is
    /// reset to zero. Already-live backends are left untouched.
    pub fn mark_up(&self, port: u16) -> Result<bool> {
        let backend = self.lookup(port)?;
        if !self.live.insert(port) {
            return Ok(false);
        }

        backend.reset_connections();
        metrics::record_backend_health(port, true);
        tracing::info!(port, "Backend recovered, adding it to rotation");
        Ok(true)
    }

    /// Take `port` out of rotation.
    ///
    /// Returns `true` on a live-to-down transition. The load counter is kept;
    /// sessions already running keep releasing it as they finish.
    pub fn mark_down(&self, port: u16) -> Result<bool> {
        self.lookup(port)?;
        if self.live.remove(&port).is_none() {
            return Ok(false);
        }

        metrics::record_backend_health(port, false);
        tracing::warn!(port, "Backend unresponsive, removing it from rotation");
        Ok(true)
    }

    /// Every configured backend, in configuration order.
    pub fn all_backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Configured ports, in configuration order.
    pub fn ports(&self) -> Vec<u16> {
        self.backends.iter().map(|b| b.port).collect()
    }

    /// Whether `port` is currently eligible for routing.
    pub fn is_live(&self, port: u16) -> bool {
        self.live.contains(&port)
    }

    /// Current load of `port`, or `None` for an unknown port.
    pub fn current_load(&self, port: u16) -> Option<usize> {
        self.lookup(port).ok().map(|b| b.load())
    }

    /// Number of live backends.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Liveness and load of every backend, in configuration order.
    pub fn snapshot(&self) -> Vec<BackendSnapshot> {
        self.backends
            .iter()
            .map(|b| BackendSnapshot {
                port: b.port,
                state: if self.is_live(b.port) {
                    HealthState::Live
                } else {
                    HealthState::Down
                },
                active_connections: b.load(),
            })
            .collect()
    }
}
