//! In-memory connection table for `WebSocket` fan-out.
//!
//! Each connection owns an unbounded outbound queue drained by its own writer task, so a send
//! never waits on a slow socket.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::game::ConnectionId;

/// A message destined for a specific `WebSocket` client.
pub type WsTx = mpsc::UnboundedSender<String>;

/// Tracks every live connection by identity.
#[derive(Debug, Clone, Default)]
pub struct BroadcastGateway {
    connections: Arc<DashMap<ConnectionId, WsTx>>,
}

impl BroadcastGateway {
    /// Create a new empty gateway.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
        }
    }

    /// Register a connection's outbound queue.
    pub fn register(&self, id: ConnectionId, tx: WsTx) {
        self.connections.insert(id, tx);
    }

    /// Forget a connection. Unknown identities are ignored.
    pub fn unregister(&self, id: ConnectionId) {
        self.connections.remove(&id);
    }

    /// Send a message to one connection.
    pub fn send_to(&self, id: ConnectionId, message: &str) {
        if let Some(tx) = self.connections.get(&id)
            && tx.send(message.to_string()).is_err()
        {
            tracing::debug!(connection = %id, "Outbound queue closed");
        }
    }

    /// Send a message to every connection.
    pub fn broadcast_all(&self, message: &str) {
        for entry in self.connections.iter() {
            if entry.value().send(message.to_string()).is_err() {
                tracing::debug!(connection = %entry.key(), "Outbound queue closed");
            }
        }
    }

    /// Check if a specific connection is registered.
    #[must_use]
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
