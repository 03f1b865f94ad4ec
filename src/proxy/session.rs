//! Per-client session handling.
//!
//! # Responsibilities
//! - Pick a backend, connect to it, charge its load
//! - Bridge client and backend with two independent pipes
//! - Release the load exactly once, when the backend→client pipe ends
//!
//! # Design Decisions
//! - Load is charged only after the backend connect succeeds, and only
//!   through the registry
//! - A failed connect rejects the client but leaves liveness alone; the
//!   health monitor decides on its next sweep
//! - The client→backend pipe ending only half-closes the backend, so a
//!   request/response exchange can finish
//! - The backend→client pipe ending closes both sockets: it stops the other
//!   pipe, whose halves are then dropped

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::error::{BalancerError, Result};
use crate::load_balancer::BackendRegistry;
use crate::net::{SessionId, SessionTracker};
use crate::observability::metrics;
use crate::proxy::pipe::{PipeOutcome, StreamPipe};

/// The two forwarding tasks of a running session.
#[derive(Debug)]
pub struct SessionHandle {
    pub id: SessionId,
    /// Backend port the session was routed to.
    pub port: u16,
    /// Client → backend.
    pub upstream: JoinHandle<PipeOutcome>,
    /// Backend → client. Its completion releases the backend's load.
    pub downstream: JoinHandle<PipeOutcome>,
}

/// Route one accepted client.
///
/// On error the client stream has been dropped (closed) and no counter was
/// touched.
pub async fn dispatch(
    client: TcpStream,
    peer_addr: SocketAddr,
    registry: &Arc<BackendRegistry>,
    sessions: &SessionTracker,
) -> Result<SessionHandle> {
    let backend = registry.select_backend()?;
    let port = backend.port;

    tracing::info!(
        peer_addr = %peer_addr,
        port,
        load = backend.load(),
        "Routing client"
    );

    let server = TcpStream::connect(backend.target())
        .await
        .map_err(|source| BalancerError::BackendConnect { port, source })?;

    let load = registry.acquire(port)?;
    let session = sessions.track();
    let id = session.id();
    metrics::record_session_opened(port);

    let _ = client.set_nodelay(true);
    let _ = server.set_nodelay(true);

    let (client_rd, client_wr) = client.into_split();
    let (server_rd, server_wr) = server.into_split();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let started = Instant::now();

    let upstream = tokio::spawn(async move {
        let outcome = StreamPipe::new(client_rd, server_wr)
            .run_until(async {
                let _ = stop_rx.await;
            })
            .await;

        metrics::record_bytes("upstream", outcome.bytes);
        tracing::debug!(
            session_id = %id,
            bytes = outcome.bytes,
            end = %outcome.end,
            clean = outcome.is_clean(),
            "Client to backend finished"
        );
        outcome
    });

    let downstream = tokio::spawn(async move {
        let outcome = StreamPipe::new(server_rd, client_wr).run().await;

        let _ = stop_tx.send(());
        drop(load);
        drop(session);

        metrics::record_bytes("downstream", outcome.bytes);
        tracing::info!(
            session_id = %id,
            port,
            bytes = outcome.bytes,
            end = %outcome.end,
            clean = outcome.is_clean(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Session closed"
        );
        outcome
    });

    tracing::debug!(session_id = %id, peer_addr = %peer_addr, port, "Session open");

    Ok(SessionHandle {
        id,
        port,
        upstream,
        downstream,
    })
}

/// Accept-loop entry point: dispatch and log rejections.
pub async fn handle_client(
    client: TcpStream,
    peer_addr: SocketAddr,
    registry: Arc<BackendRegistry>,
    sessions: SessionTracker,
) {
    if let Err(e) = dispatch(client, peer_addr, &registry, &sessions).await {
        metrics::record_rejected(e.reason());
        tracing::warn!(peer_addr = %peer_addr, error = %e, "Client rejected");
    }
}
