//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use tcp_balancer::config::{BalancerConfig, ListenerConfig};
use tcp_balancer::net::{Listener, SessionTracker};
use tcp_balancer::{BackendRegistry, ProxyServer, Shutdown};

/// Start an echo backend on an ephemeral port.
pub async fn start_echo_backend() -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (port, spawn_echo(listener))
}

/// Start an echo backend on a specific address (used to bring one back).
pub async fn start_echo_backend_on(addr: SocketAddr) -> JoinHandle<()> {
    let listener = TcpListener::bind(addr).await.unwrap();
    spawn_echo(listener)
}

fn spawn_echo(listener: TcpListener) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let (mut rd, mut wr) = socket.split();
                        let _ = tokio::io::copy(&mut rd, &mut wr).await;
                        let _ = wr.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    })
}

/// Start a backend that writes `reply` to every connection and closes it.
pub async fn start_closing_backend(reply: &'static [u8]) -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let _ = socket.write_all(reply).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
    (port, handle)
}

/// A port nothing listens on.
pub async fn refused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Stop a backend's accept loop and wait until its socket is gone.
pub async fn stop_backend(handle: JoinHandle<()>) {
    handle.abort();
    let _ = handle.await;
}

/// Configuration pointing at 127.0.0.1 backends with test-friendly timings.
pub fn test_config(ports: &[u16], health_interval_ms: u64) -> BalancerConfig {
    let mut config = BalancerConfig::default();
    config.listener = ListenerConfig {
        bind_host: "127.0.0.1".into(),
        port: 0,
    };
    config.backends.host = "127.0.0.1".into();
    config.backends.ports = ports.to_vec();
    config.health_check.interval_ms = health_interval_ms;
    config.health_check.timeout_ms = 500;
    config.stats.interval_ms = 1000;
    config
}

/// A running balancer.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub registry: Arc<BackendRegistry>,
    pub sessions: SessionTracker,
    pub shutdown: Shutdown,
}

impl Drop for TestProxy {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_proxy(config: BalancerConfig) -> TestProxy {
    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = ProxyServer::new(config);
    let registry = server.registry();
    let sessions = server.sessions();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestProxy {
        addr,
        registry,
        sessions,
        shutdown,
    }
}

/// Poll `condition` until it holds or `timeout` passes.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}
