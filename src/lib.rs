//! Layer-4 TCP load balancer library.
//!
//! Accepts client connections, routes each one to the live backend with the
//! fewest active connections, and relays raw bytes in both directions.

pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod load_balancer;
pub mod net;
pub mod observability;
pub mod proxy;

pub use config::schema::BalancerConfig;
pub use error::{BalancerError, Result};
pub use lifecycle::Shutdown;
pub use load_balancer::BackendRegistry;
pub use proxy::ProxyServer;
