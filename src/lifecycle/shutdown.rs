//! Stop signal for the long-running loops.

use tokio::sync::broadcast;

/// Broadcast stop signal.
///
/// The accept loop, health monitor, and stats reporter each hold a receiver
/// and leave their loop when it fires. Open sessions are not tracked or
/// drained; they end when their sockets do.
///
/// Only [`Shutdown::trigger`] stops the loops. Dropping every `Shutdown`
/// without triggering closes the channel, which the loops ignore.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the stop signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the stop signal. Returns how many receivers were listening.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
