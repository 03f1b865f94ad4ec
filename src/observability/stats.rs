//! Periodic status report.
//!
//! Reads the registry on a timer and logs one snapshot per tick: every
//! configured backend with its ONLINE/OFFLINE state and active connection
//! count. Never mutates anything.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::config::{StatsConfig, StatsFormat};
use crate::load_balancer::{BackendRegistry, BackendSnapshot};
use crate::net::SessionTracker;

#[derive(Debug, Serialize)]
struct Report<'a> {
    active_sessions: u64,
    backends: &'a [BackendSnapshot],
}

/// Aligned text table, one row per backend.
pub fn render_table(snapshot: &[BackendSnapshot], active_sessions: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<8}| {:<8}| {}", "PORT", "STATUS", "ACTIVE");
    let _ = writeln!(out, "{:-<8}+{:-<9}+{:-<7}", "", "", "");
    for b in snapshot {
        let _ = writeln!(out, "{:<8}| {:<8}| {}", b.port, b.state, b.active_connections);
    }
    let _ = write!(out, "open sessions: {active_sessions}");
    out
}

/// Single-line JSON document.
pub fn render_json(snapshot: &[BackendSnapshot], active_sessions: u64) -> serde_json::Result<String> {
    serde_json::to_string(&Report { active_sessions, backends: snapshot })
}

/// Background task that logs registry snapshots.
pub struct StatsReporter {
    registry: Arc<BackendRegistry>,
    sessions: SessionTracker,
    config: StatsConfig,
}

impl StatsReporter {
    pub fn new(registry: Arc<BackendRegistry>, sessions: SessionTracker, config: StatsConfig) -> Self {
        Self { registry, sessions, config }
    }

    /// Render the current state in the configured format.
    pub fn report(&self) -> String {
        let snapshot = self.registry.snapshot();
        let active = self.sessions.active_count();
        match self.config.format {
            StatsFormat::Table => render_table(&snapshot, active),
            StatsFormat::Json => render_json(&snapshot, active)
                .unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")),
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        if !self.config.enabled {
            tracing::info!("Stats reporter disabled");
            return;
        }

        let mut ticker = time::interval(Duration::from_millis(self.config.interval_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the immediate first tick; the first report comes one interval in.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::info!(target: "tcp_balancer::stats", "Backend status\n{}", self.report());
                }
                Ok(()) = shutdown.recv() => {
                    tracing::debug!("Stats reporter received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
