//! Byte-forwarding proxy subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted client
//!     → server.rs (accept loop, spawns one task per client)
//!     → session.rs (select backend, connect, charge load)
//!     → pipe.rs ×2 (client→backend, backend→client)
//!     → backend→client ends: release load, close both sockets
//! ```
//!
//! # Design Decisions
//! - Protocol-agnostic: bytes are never inspected
//! - No retries, no queueing: a client that cannot be routed is closed

pub mod pipe;
pub mod server;
pub mod session;

pub use pipe::{PipeEnd, PipeOutcome, StreamPipe};
pub use server::ProxyServer;
pub use session::{dispatch, SessionHandle};
