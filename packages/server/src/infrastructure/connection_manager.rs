//! Registry of connected sockets.
//!
//! Each upgraded socket registers the sending half of an unbounded channel;
//! a per-socket task drains that channel into the WebSocket sink.

use std::collections::HashMap;

use tokio::sync::{Mutex, mpsc};
use uuid::Uuid;

/// Channel used to push text frames to one socket
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Identifier assigned to a socket when it registers
pub type ConnectionId = Uuid;

/// Connected sockets keyed by a generated id
#[derive(Debug, Default)]
pub struct ConnectionManager {
    connections: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a socket and return its id
    pub async fn add(&self, sender: PusherChannel) -> ConnectionId {
        let id = Uuid::new_v4();
        self.connections.lock().await.insert(id, sender);
        tracing::debug!("Connection {} registered", id);
        id
    }

    pub async fn remove(&self, id: &ConnectionId) {
        if self.connections.lock().await.remove(id).is_some() {
            tracing::debug!("Connection {} unregistered", id);
        }
    }

    pub async fn count(&self) -> usize {
        self.connections.lock().await.len()
    }

    /// Push `content` to every registered socket.
    ///
    /// Sockets whose channel is gone are skipped. Returns how many pushes
    /// succeeded.
    pub async fn broadcast(&self, content: &str) -> usize {
        let connections = self.connections.lock().await;
        let mut delivered = 0;

        for (id, sender) in connections.iter() {
            if let Err(e) = sender.send(content.to_string()) {
                tracing::warn!("Error sending message to connection {}: {}", id, e);
                continue;
            }
            tracing::debug!("Sent message to connection {}", id);
            delivered += 1;
        }

        delivered
    }
}
