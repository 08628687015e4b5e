//! Connection registry: which user a live connection has registered as.
//!
//! A cache rebuilt from `register_user` events. The user record's stored
//! connection id stays authoritative for routing to a user.

use dashmap::DashMap;

use liveboard_core::types::{ConnectionId, UserId};

/// Concurrent map from connection to user.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    slots: DashMap<ConnectionId, UserId>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a connection to a user, replacing any previous binding.
    pub fn bind(&self, conn_id: ConnectionId, user_id: UserId) {
        self.slots.insert(conn_id, user_id);
    }

    /// The user a connection is bound to.
    pub fn lookup(&self, conn_id: &ConnectionId) -> Option<UserId> {
        self.slots.get(conn_id).map(|entry| *entry.value())
    }

    /// Removes a binding, returning the user it pointed to.
    pub fn unbind(&self, conn_id: &ConnectionId) -> Option<UserId> {
        self.slots.remove(conn_id).map(|(_, user_id)| user_id)
    }

    /// Drops every binding.
    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Number of bound connections.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no connection is bound.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
