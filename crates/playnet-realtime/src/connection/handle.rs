//! Individual socket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use playnet_core::types::id::{ConnectionId, UserId};
use playnet_entity::user::UserRef;

use crate::event::ServerEvent;

/// A handle to one live, bidirectional connection.
///
/// Created at successful authentication, destroyed at disconnect. Holds
/// the sender half of the connection's outbound queue plus the
/// authenticated user identity. A user reconnecting gets a brand-new
/// handle; the old one is orphaned in place.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID. Distinguishes this handle from any other
    /// handle the same user has ever held.
    pub id: ConnectionId,
    /// The authenticated user this connection belongs to.
    pub user: UserRef,
    /// When the connection was established.
    pub connected_at: DateTime<Utc>,
    /// Sender for outbound events.
    sender: mpsc::Sender<ServerEvent>,
    /// Whether the connection is still alive.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle for an authenticated user.
    pub fn new(user: UserRef, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self {
            id: ConnectionId::new(),
            user,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
        }
    }

    /// The owning user's id.
    pub fn user_id(&self) -> UserId {
        UserId::from(self.user.id)
    }

    /// The owning user's username.
    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// Push an outbound event to this connection, best-effort.
    ///
    /// Returns `false` if the connection is closed or its buffer is
    /// full; the caller never retries, durable storage is the retry
    /// mechanism.
    pub fn send(&self, event: ServerEvent) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "send buffer full, dropping event");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Check if the connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the connection as closed.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn test_user() -> UserRef {
        UserRef {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = ConnectionHandle::new(test_user(), tx);

        assert!(handle.send(ServerEvent::Error {
            message: "oops".to_string(),
        }));
        assert!(matches!(
            rx.try_recv().unwrap(),
            ServerEvent::Error { .. }
        ));
    }

    #[test]
    fn test_send_after_close_returns_false() {
        let (tx, _rx) = mpsc::channel(8);
        let handle = ConnectionHandle::new(test_user(), tx);
        handle.mark_closed();

        assert!(!handle.send(ServerEvent::Error {
            message: "oops".to_string(),
        }));
    }

    #[test]
    fn test_send_to_dropped_receiver_marks_dead() {
        let (tx, rx) = mpsc::channel(8);
        let handle = ConnectionHandle::new(test_user(), tx);
        drop(rx);

        assert!(!handle.send(ServerEvent::Error {
            message: "oops".to_string(),
        }));
        assert!(!handle.is_alive());
    }

    #[test]
    fn test_each_handle_gets_unique_id() {
        let (tx, _rx) = mpsc::channel(8);
        let h1 = ConnectionHandle::new(test_user(), tx.clone());
        let h2 = ConnectionHandle::new(test_user(), tx);
        assert_ne!(h1.id, h2.id);
    }
}
