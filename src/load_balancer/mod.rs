//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Client accepted
//!     → registry.rs (filter configured backends down to the live set)
//!     → least_conn.rs (pick backend with fewest connections)
//!     → registry.rs (charge the session through a LoadGuard)
//!     → Return backend or NoLiveBackend
//! ```
//!
//! # Design Decisions
//! - Selector is stateless; backends track their own connections
//! - Down backends excluded from selection
//! - Health monitor owns liveness, dispatcher owns load

use std::sync::Arc;

pub mod backend;
pub mod least_conn;
pub mod registry;

pub use backend::Backend;
pub use registry::{BackendRegistry, BackendSnapshot, LoadGuard};

/// A backend selection strategy.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    /// Choose one of `backends`, or `None` if the slice is empty.
    fn next_server(&self, backends: &[Arc<Backend>]) -> Option<Arc<Backend>>;
}
