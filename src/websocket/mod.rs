use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod handlers;
pub mod message_types;

/// Unique identifier for a live WebSocket connection
///
/// Bindings are keyed by user id, but removal is keyed by this identity so
/// that a late disconnect can never evict a newer binding created by the
/// same user reconnecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Current binding of a user to a connection.
struct Binding {
    id: ConnectionId,
    sender: UnboundedSender<String>,
}

/// Presence registry: user id -> live connection handle
///
/// Holds at most one binding per user; a later `register` for the same user
/// unconditionally overwrites the earlier one (reconnect without logout).
/// Nothing is persisted, so after a process restart every user is offline
/// until they identify again.
#[derive(Default, Clone)]
pub struct PresenceRegistry {
    inner: Arc<RwLock<HashMap<Uuid, Binding>>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `user_id` to a fresh connection handle, overwriting any prior
    /// binding for that user.
    ///
    /// Returns (connection_id, receiver): the id names this binding for
    /// later removal, the receiver yields payloads relayed to the user.
    pub async fn register(&self, user_id: Uuid) -> (ConnectionId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let id = ConnectionId::new();

        let mut guard = self.inner.write().await;
        guard.insert(user_id, Binding { id, sender: tx });

        tracing::debug!(%user_id, connection_id = ?id, "presence binding registered");

        (id, rx)
    }

    /// Resolve a user's live connection handle, if any. Pure read.
    pub async fn lookup(&self, user_id: Uuid) -> Option<UnboundedSender<String>> {
        let guard = self.inner.read().await;
        guard.get(&user_id).map(|binding| binding.sender.clone())
    }

    /// Remove the binding for `user_id`, but only if it is still the one
    /// identified by `connection_id`.
    ///
    /// A disconnect observed after the same user re-registered from a new
    /// connection must leave the newer binding in place.
    pub async fn remove(&self, user_id: Uuid, connection_id: ConnectionId) {
        let mut guard = self.inner.write().await;
        if guard
            .get(&user_id)
            .is_some_and(|binding| binding.id == connection_id)
        {
            guard.remove(&user_id);
            tracing::debug!(%user_id, connection_id = ?connection_id, "presence binding removed");
        }
    }

    /// Number of users currently bound (for debugging/metrics).
    pub async fn online_count(&self) -> usize {
        self.inner.read().await.len()
    }
}
