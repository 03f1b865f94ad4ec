//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build registry → Start loops → Accept
//!
//! Stop (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger → loops exit
//! ```
//!
//! # Design Decisions
//! - Fail fast at startup: bad config or bind failure is fatal
//! - No drain phase: in-flight sessions are not waited for

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
