//! Balancer server setup.
//!
//! # Responsibilities
//! - Build the shared registry from configuration
//! - Spawn the health monitor and stats reporter
//! - Run the accept loop, one task per accepted client

use std::io;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::config::BalancerConfig;
use crate::health::HealthMonitor;
use crate::load_balancer::BackendRegistry;
use crate::net::{Listener, SessionTracker};
use crate::observability::StatsReporter;
use crate::proxy::session::handle_client;

/// The TCP load balancer.
pub struct ProxyServer {
    config: BalancerConfig,
    registry: Arc<BackendRegistry>,
    sessions: SessionTracker,
}

impl ProxyServer {
    /// Create a new server with the given configuration.
    pub fn new(config: BalancerConfig) -> Self {
        let registry = Arc::new(BackendRegistry::from_config(&config.backends));
        Self {
            config,
            registry,
            sessions: SessionTracker::new(),
        }
    }

    /// Shared routing state.
    pub fn registry(&self) -> Arc<BackendRegistry> {
        Arc::clone(&self.registry)
    }

    /// Open-session counter.
    pub fn sessions(&self) -> SessionTracker {
        self.sessions.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    /// Run until `shutdown` fires.
    ///
    /// Accept errors are logged and the loop continues. Shutdown stops
    /// accepting and stops the background loops; sessions already running
    /// are left to finish on their own.
    pub async fn run(self, listener: Listener, mut shutdown: broadcast::Receiver<()>) -> io::Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend_host = %self.config.backends.host,
            backends = ?self.registry.ports(),
            "Load balancer starting"
        );

        let monitor = HealthMonitor::new(self.registry(), self.config.health_check.clone());
        tokio::spawn(monitor.run(shutdown.resubscribe()));

        let reporter = StatsReporter::new(self.registry(), self.sessions(), self.config.stats.clone());
        tokio::spawn(reporter.run(shutdown.resubscribe()));

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        tokio::spawn(handle_client(stream, peer_addr, self.registry(), self.sessions()));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Accept failed, continuing");
                    }
                },
                Ok(()) = shutdown.recv() => {
                    tracing::info!("Accept loop received shutdown signal");
                    break;
                }
            }
        }

        tracing::info!("Load balancer stopped");
        Ok(())
    }
}
