//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, uptime timestamps)
//!     → metrics.rs (counters and gauges)
//!
//! stats.rs reads the registry on a timer:
//!     → table or JSON snapshot in the log
//! ```
//!
//! # Design Decisions
//! - Advisory only: nothing here changes routing state
//! - Metrics are cheap (atomic increments) and no-ops when disabled

pub mod logging;
pub mod metrics;
pub mod stats;

pub use stats::StatsReporter;
