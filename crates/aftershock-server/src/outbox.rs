//! Per-connection outbound queues.
//!
//! Each accepted channel registers an unbounded sender here; its writer
//! task drains the matching receiver onto the socket. Delivery is
//! best-effort and at-most-once: a closed queue just means the
//! connection is going away.

use std::collections::HashMap;

use aftershock_types::{ConnectionId, ServerEvent};
use tokio::sync::RwLock;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Sending half of one connection's queue.
pub type OutboxSender = UnboundedSender<ServerEvent>;

/// All open connections' outbound queues.
#[derive(Debug, Default)]
pub struct Outboxes {
    senders: RwLock<HashMap<ConnectionId, OutboxSender>>,
}

impl Outboxes {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a queue for `id`. Returns `false` and keeps the existing
    /// queue if `id` is already registered.
    pub async fn register(&self, id: ConnectionId, sender: OutboxSender) -> bool {
        let mut senders = self.senders.write().await;
        if senders.contains_key(&id) {
            return false;
        }
        senders.insert(id, sender);
        true
    }

    /// Drop the queue for `id`.
    pub async fn remove(&self, id: ConnectionId) {
        self.senders.write().await.remove(&id);
    }

    /// Queue `event` for one connection. Returns whether it was queued.
    pub async fn send_to(&self, id: ConnectionId, event: ServerEvent) -> bool {
        let senders = self.senders.read().await;
        let Some(sender) = senders.get(&id) else {
            debug!(conn = %id, event = event.name(), "no outbox, dropping");
            return false;
        };
        sender.send(event).is_ok()
    }

    /// Every open connection, minus `exclude`.
    pub async fn recipients(&self, exclude: Option<ConnectionId>) -> Vec<ConnectionId> {
        self.senders
            .read()
            .await
            .keys()
            .copied()
            .filter(|id| Some(*id) != exclude)
            .collect()
    }

    /// Queue `event` for each of `recipients`. Returns how many queued.
    pub async fn deliver(&self, recipients: &[ConnectionId], event: &ServerEvent) -> usize {
        let senders = self.senders.read().await;
        recipients
            .iter()
            .filter_map(|id| senders.get(id))
            .filter(|sender| sender.send(event.clone()).is_ok())
            .count()
    }

    /// Number of open connections.
    pub async fn len(&self) -> usize {
        self.senders.read().await.len()
    }

    /// Whether no connection is open.
    pub async fn is_empty(&self) -> bool {
        self.senders.read().await.is_empty()
    }
}
