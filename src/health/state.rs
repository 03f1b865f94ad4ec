//! Backend health state machine.
//!
//! # States
//! - Live: backend receives new sessions
//! - Down: backend excluded from load balancing
//!
//! # State Transitions
//! ```text
//! Live → Down: a single failed probe
//! Down → Live: a single successful probe (load counter reset to 0)
//! ```
//!
//! # Design Decisions
//! - No hysteresis: a flapping backend changes state every sweep
//! - Transitions are logged by the registry; repeated marks are silent
//! - Every backend starts Live; the first sweep corrects that if wrong

use serde::Serialize;

/// Liveness of one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthState {
    #[serde(rename = "ONLINE")]
    Live,
    #[serde(rename = "OFFLINE")]
    Down,
}

impl HealthState {
    /// State implied by a probe outcome.
    pub fn from_probe(reachable: bool) -> Self {
        if reachable {
            HealthState::Live
        } else {
            HealthState::Down
        }
    }

    pub fn is_live(self) -> bool {
        self == HealthState::Live
    }
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Live => f.pad("ONLINE"),
            HealthState::Down => f.pad("OFFLINE"),
        }
    }
}
