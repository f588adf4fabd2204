//! Presence registry — the in-memory source of truth for who is online.

use std::sync::Arc;

use dashmap::DashMap;

use playnet_core::types::id::{ConnectionId, UserId};

use super::handle::ConnectionHandle;

/// In-memory mapping from user id to their single live connection handle.
///
/// At most one handle is retained per user: registering while an entry
/// exists overwrites it, orphaning the previous handle. Deregistration is
/// guarded by connection id so a late disconnect from a superseded
/// connection can never evict a newer, valid one.
///
/// Purely in-memory; rebuilt from empty on process restart.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    /// User ID → current connection handle.
    entries: DashMap<UserId, Arc<ConnectionHandle>>,
}

impl PresenceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert or overwrite the handle for the handle's user.
    ///
    /// Returns whether a prior handle existed for this user (diagnostic
    /// only; callers must not branch behavior on it).
    pub fn register(&self, handle: Arc<ConnectionHandle>) -> bool {
        self.entries.insert(handle.user_id(), handle).is_some()
    }

    /// Look up the live handle for a user, if any.
    pub fn lookup(&self, user_id: UserId) -> Option<Arc<ConnectionHandle>> {
        self.entries.get(&user_id).map(|entry| entry.value().clone())
    }

    /// Remove the mapping for `user_id` only if the currently registered
    /// handle is exactly `conn_id`.
    ///
    /// Returns whether an entry was actually removed. A `false` return
    /// means the disconnecting handle was already superseded and the
    /// caller must skip all offline side effects.
    pub fn deregister(&self, user_id: UserId, conn_id: ConnectionId) -> bool {
        self.entries
            .remove_if(&user_id, |_, handle| handle.id == conn_id)
            .is_some()
    }

    /// All live handles except the given user's, for presence fan-out.
    pub fn all_except(&self, user_id: UserId) -> Vec<Arc<ConnectionHandle>> {
        self.entries
            .iter()
            .filter(|entry| *entry.key() != user_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Whether a user currently has a registered connection.
    pub fn is_online(&self, user_id: UserId) -> bool {
        self.entries.contains_key(&user_id)
    }

    /// Number of registered connections.
    pub fn online_count(&self) -> usize {
        self.entries.len()
    }

    /// All currently connected user ids.
    pub fn connected_user_ids(&self) -> Vec<UserId> {
        self.entries.iter().map(|entry| *entry.key()).collect()
    }
}
