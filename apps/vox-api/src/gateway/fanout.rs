//! Broadcast hub for fanning cast votes out to connected clients.
//!
//! Uses a single `tokio::sync::broadcast` channel. Each connection subscribes
//! and filters events locally by its channel subscriptions. Single-process
//! fan-out; the hub is the seam a distributed backend would replace.

use std::sync::Arc;

use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Slow receivers that fall behind will
/// skip messages (RecvError::Lagged).
const BROADCAST_CAPACITY: usize = 4096;

/// A cast vote fanned out to all connected clients.
#[derive(Debug, Clone)]
pub struct VoteCast {
    /// The group whose channel this vote belongs to.
    pub group: String,
    /// The participant the vote was cast for.
    pub participant: String,
}

/// The vote broadcast hub. Cloneable — stored in AppState.
#[derive(Clone)]
pub struct VoteBroadcast {
    sender: broadcast::Sender<Arc<VoteCast>>,
}

impl VoteBroadcast {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Subscribe to the hub. Each connection task calls this once to get its
    /// own receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<VoteCast>> {
        self.sender.subscribe()
    }

    /// Dispatch a cast vote to all connected clients.
    pub fn dispatch(&self, cast: VoteCast) {
        // send() returns Err if there are no receivers — that's fine.
        let _ = self.sender.send(Arc::new(cast));
    }
}

impl Default for VoteBroadcast {
    fn default() -> Self {
        Self::new()
    }
}
