//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Periodic timer
//!     → Connect-then-close probe to each backend, in configuration order
//!     → registry mark_up / mark_down
//!
//! State machine (state.rs):
//!     Live ←→ Down
//! ```
//!
//! # Design Decisions
//! - The health monitor is the only writer of liveness; failed dispatch
//!   connects do not mark a backend down
//! - Health state is per-backend and independent of traffic
//! - Probe failures are never fatal to the loop

pub mod active;
pub mod state;

pub use active::HealthMonitor;
pub use state::HealthState;
