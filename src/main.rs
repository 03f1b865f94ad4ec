//! TCP Load Balancer
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                  TCP BALANCER                     │
//!   Client           │  ┌──────────┐   ┌───────────┐   ┌─────────────┐  │
//!   ─────────────────┼─▶│ listener │──▶│ dispatch  │──▶│  registry   │  │
//!                    │  └──────────┘   └─────┬─────┘   │ live set +  │  │
//!                    │                       │         │ load table  │  │
//!                    │            ┌──────────┴───┐     └──────▲──────┘  │
//!                    │            │ pipe  c → b  │────────────┼─────────┼──▶ Backend
//!   ◀────────────────┼────────────│ pipe  b → c  │◀───────────┼─────────┼─── (host:port)
//!                    │            └──────────────┘            │         │
//!                    │  ┌────────────────┐  ┌─────────────────┴──────┐  │
//!                    │  │ stats reporter │  │ health monitor         │  │
//!                    │  │ (read only)    │  │ (connect probes)       │  │
//!                    │  └────────────────┘  └────────────────────────┘  │
//!                    └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use tcp_balancer::config::{resolve_config, ConfigOverrides};
use tcp_balancer::lifecycle::{wait_for_signal, Shutdown};
use tcp_balancer::net::Listener;
use tcp_balancer::observability::{logging, metrics};
use tcp_balancer::ProxyServer;

#[derive(Parser)]
#[command(name = "tcp-balancer")]
#[command(about = "Least-connections TCP load balancer", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "balancer.toml")]
    config: PathBuf,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(&cli.config, &cli.overrides)?;
    logging::init_logging(&config.observability);

    if !cli.config.exists() {
        tracing::warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    tracing::info!(
        listen_port = config.listener.port,
        backend_host = %config.backends.host,
        backends = ?config.backends.ports,
        health_interval_ms = config.health_check.interval_ms,
        stats_interval_ms = config.stats.interval_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        trigger.trigger();
    });

    ProxyServer::new(config).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
