//! The session registry: who is in the drill and where they are.
//!
//! The registry owns its own lock, independent of the disaster engine's,
//! and callers never hold both at once.

use std::collections::BTreeMap;

use aftershock_types::{ConnectionId, ParticipantSession, Transform};
use tokio::sync::RwLock;

/// Mapping from live connection to participant transform.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    participants: RwLock<BTreeMap<ConnectionId, Transform>>,
}

impl SessionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `id` at the origin with zero rotation.
    ///
    /// Joining again resets the transform. Returns the registered entry.
    pub async fn join(&self, id: ConnectionId) -> ParticipantSession {
        let transform = Transform::default();
        self.participants.write().await.insert(id, transform);
        ParticipantSession { id, transform }
    }

    /// Replace the transform of `id`.
    ///
    /// Returns `false`, changing nothing, if `id` is not registered. Late
    /// updates from a connection that already left land here.
    pub async fn update(&self, id: ConnectionId, transform: Transform) -> bool {
        let mut participants = self.participants.write().await;
        match participants.get_mut(&id) {
            Some(slot) => {
                *slot = transform;
                true
            }
            None => false,
        }
    }

    /// Remove `id`. Returns whether it was registered.
    pub async fn leave(&self, id: ConnectionId) -> bool {
        self.participants.write().await.remove(&id).is_some()
    }

    /// Copy of every entry.
    pub async fn snapshot(&self) -> BTreeMap<ConnectionId, Transform> {
        self.participants.read().await.clone()
    }

    /// One entry, if registered.
    pub async fn get(&self, id: ConnectionId) -> Option<ParticipantSession> {
        self.participants
            .read()
            .await
            .get(&id)
            .map(|&transform| ParticipantSession { id, transform })
    }

    /// Number of registered participants.
    pub async fn len(&self) -> usize {
        self.participants.read().await.len()
    }

    /// Whether nobody is registered.
    pub async fn is_empty(&self) -> bool {
        self.participants.read().await.is_empty()
    }
}
