//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe backends with a bare TCP connect
//! - Update registry liveness based on results

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::state::HealthState;
use crate::load_balancer::{Backend, BackendRegistry};

/// Open a connection to `backend` and close it straight away.
///
/// Refusal, timeout, and any other I/O error all count as failure.
pub async fn probe(backend: &Backend, timeout: Duration) -> io::Result<()> {
    match time::timeout(timeout, TcpStream::connect(backend.target())).await {
        Ok(Ok(stream)) => {
            drop(stream);
            Ok(())
        }
        Ok(Err(e)) => Err(e),
        Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "probe timed out")),
    }
}

/// Background task that owns backend liveness.
pub struct HealthMonitor {
    registry: Arc<BackendRegistry>,
    config: HealthCheckConfig,
}

impl HealthMonitor {
    pub fn new(registry: Arc<BackendRegistry>, config: HealthCheckConfig) -> Self {
        Self { registry, config }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Active health checks disabled");
            return;
        }

        tracing::info!(
            interval_ms = self.config.interval_ms,
            timeout_ms = self.config.timeout_ms,
            backends = self.registry.all_backends().len(),
            "Health monitor starting"
        );

        // The first tick fires immediately, so startup gets a sweep right away.
        let mut ticker = time::interval(Duration::from_millis(self.config.interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_all().await;
                }
                Ok(()) = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Probe every backend once, in configuration order.
    pub async fn check_all(&self) {
        let timeout = Duration::from_millis(self.config.timeout_ms);

        for backend in self.registry.all_backends() {
            let outcome = probe(backend, timeout).await;
            if let Err(e) = &outcome {
                tracing::debug!(port = backend.port, error = %e, "Health probe failed");
            }

            let result = match HealthState::from_probe(outcome.is_ok()) {
                HealthState::Live => self.registry.mark_up(backend.port),
                HealthState::Down => self.registry.mark_down(backend.port),
            };
            if let Err(e) = result {
                tracing::error!(port = backend.port, error = %e, "Failed to record probe result");
            }
        }
    }
}
