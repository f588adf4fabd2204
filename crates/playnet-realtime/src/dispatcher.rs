//! Dispatch router — turns inbound events into durable writes and
//! best-effort pushes.
//!
//! Each connection's events are processed one at a time in arrival
//! order (the socket read loop awaits each handler), so per-pair message
//! ordering follows from the per-connection mpsc queues. Across
//! connections, handlers interleave freely; the registry is the only
//! shared mutable state. While a handler awaits a store write the
//! registry may change under it, so every push does a fresh
//! [`PresenceRegistry::lookup`] via [`DispatchRouter::push_to_user`]
//! rather than reusing a pre-await snapshot.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info};

use playnet_core::types::id::{ConnectionRequestId, MessageId, UserId};
use playnet_entity::notification::NotificationKind;
use playnet_entity::user::{PresenceState, UserRef};

use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::PresenceRegistry;
use crate::event::{ClientEvent, ServerEvent};
use crate::store::{MessageStore, NotificationStore, UserStore};

/// The core logic component: persistence writes plus push delivery.
pub struct DispatchRouter {
    /// Who is online right now.
    registry: Arc<PresenceRegistry>,
    /// Durable message store.
    messages: Arc<dyn MessageStore>,
    /// Durable notification store.
    notifications: Arc<dyn NotificationStore>,
    /// User directory and durable presence updater.
    users: Arc<dyn UserStore>,
}

impl std::fmt::Debug for DispatchRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchRouter").finish()
    }
}

impl DispatchRouter {
    /// Creates a new dispatch router.
    pub fn new(
        registry: Arc<PresenceRegistry>,
        messages: Arc<dyn MessageStore>,
        notifications: Arc<dyn NotificationStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            registry,
            messages,
            notifications,
            users,
        }
    }

    /// Deliver an event to a user's live handle, if they have one.
    ///
    /// The single push primitive: looks the target up at call time, so a
    /// caller that awaited storage in between still sees the current
    /// registry state. Returns whether a handle accepted the event; an
    /// offline target is a normal outcome, never an error.
    pub fn push_to_user(&self, user_id: UserId, event: ServerEvent) -> bool {
        match self.registry.lookup(user_id) {
            Some(handle) => handle.send(event),
            None => false,
        }
    }

    /// Admit a freshly authenticated connection.
    ///
    /// Registers the handle (overwriting any prior one for the same
    /// user), flips durable presence to online, and announces the user
    /// to everyone else.
    pub async fn handle_connect(&self, handle: Arc<ConnectionHandle>) {
        let user_id = handle.user_id();
        let username = handle.username().to_string();

        let replaced = self.registry.register(handle);
        if replaced {
            debug!(%user_id, "previous connection superseded");
        }

        if let Err(e) = self
            .users
            .set_presence(user_id, PresenceState::Online, Utc::now())
            .await
        {
            // The registry, not the durable row, is the source of truth
            // for deliverability; the row catches up on the next
            // transition.
            error!(%user_id, error = %e, "failed to persist online presence");
        }

        self.broadcast_except(
            user_id,
            ServerEvent::UserOnline {
                user_id,
                username: username.clone(),
            },
        );

        info!(%user_id, %username, "connection admitted");
    }

    /// Process one inbound event from an authenticated connection.
    pub async fn handle_event(&self, handle: &Arc<ConnectionHandle>, event: ClientEvent) {
        match event {
            ClientEvent::MessagePrivate {
                recipient_id,
                content,
            } => {
                self.handle_private_message(handle, recipient_id, content)
                    .await;
            }
            ClientEvent::TypingStart { recipient_id } => {
                self.relay_typing(handle, recipient_id, true);
            }
            ClientEvent::TypingStop { recipient_id } => {
                self.relay_typing(handle, recipient_id, false);
            }
        }
    }

    /// Tear down a disconnected handle.
    ///
    /// Uses the guarded deregister: when this handle was already
    /// superseded by a newer connection for the same user, presence,
    /// durable status, and broadcast are all left untouched — a stale
    /// disconnect must never flip a reconnected user to offline.
    pub async fn handle_disconnect(&self, handle: &Arc<ConnectionHandle>) {
        let user_id = handle.user_id();

        if !self.registry.deregister(user_id, handle.id) {
            debug!(%user_id, conn_id = %handle.id, "stale disconnect ignored");
            return;
        }

        handle.mark_closed();

        if let Err(e) = self
            .users
            .set_presence(user_id, PresenceState::Offline, Utc::now())
            .await
        {
            error!(%user_id, error = %e, "failed to persist offline presence");
        }

        self.broadcast_except(
            user_id,
            ServerEvent::UserOffline {
                user_id,
                username: handle.username().to_string(),
            },
        );

        info!(%user_id, "connection closed");
    }

    /// Persist and deliver a private message.
    ///
    /// Empty content (after trimming) is silently ignored. A store
    /// failure on the message write is reported to the origin only and
    /// nothing is pushed; the notification write is independent, and its
    /// failure leaves the already-durable message in place.
    async fn handle_private_message(
        &self,
        sender: &Arc<ConnectionHandle>,
        recipient_id: UserId,
        content: String,
    ) {
        let content = content.trim();
        if content.is_empty() {
            return;
        }

        let message = match self
            .messages
            .create(sender.user_id(), recipient_id, content)
            .await
        {
            Ok(message) => message,
            Err(e) => {
                error!(
                    sender = %sender.user_id(),
                    recipient = %recipient_id,
                    error = %e,
                    "message persistence failed"
                );
                sender.send(ServerEvent::Error {
                    message: "Failed to send message".to_string(),
                });
                return;
            }
        };

        self.push_to_user(
            recipient_id,
            ServerEvent::MessageReceive {
                id: MessageId::from(message.id),
                sender_id: sender.user_id(),
                sender_name: sender.username().to_string(),
                content: message.content.clone(),
                created_at: message.created_at,
            },
        );

        match self
            .notifications
            .create(
                recipient_id,
                sender.user_id(),
                NotificationKind::Message,
                Some(message.id),
            )
            .await
        {
            Ok(notification) => {
                self.push_to_user(
                    recipient_id,
                    ServerEvent::NotificationNew {
                        notification,
                        sender: sender.user.clone(),
                    },
                );
            }
            Err(e) => {
                // The message is already durable and delivered; only the
                // notification record is missing.
                error!(
                    recipient = %recipient_id,
                    error = %e,
                    "notification persistence failed"
                );
                sender.send(ServerEvent::Error {
                    message: "Failed to create notification".to_string(),
                });
            }
        }

        sender.send(ServerEvent::MessageSent {
            id: MessageId::from(message.id),
            recipient_id,
            content: message.content,
            created_at: message.created_at,
        });
    }

    /// Relay a typing indicator. No persistence; dropped when the
    /// recipient is offline.
    fn relay_typing(&self, sender: &Arc<ConnectionHandle>, recipient_id: UserId, is_typing: bool) {
        self.push_to_user(
            recipient_id,
            ServerEvent::TypingIndicator {
                user_id: sender.user_id(),
                username: sender.username().to_string(),
                is_typing,
            },
        );
    }

    /// Persist and deliver a connection-request notification.
    pub async fn notify_connection_request(
        &self,
        sender: &UserRef,
        recipient_id: UserId,
        request_id: ConnectionRequestId,
    ) -> playnet_core::AppResult<()> {
        self.notify(
            sender,
            recipient_id,
            NotificationKind::ConnectionRequest,
            Some(request_id.into_uuid()),
        )
        .await
    }

    /// Persist and deliver a connection-accepted notification.
    pub async fn notify_connection_accepted(
        &self,
        sender: &UserRef,
        recipient_id: UserId,
        request_id: ConnectionRequestId,
    ) -> playnet_core::AppResult<()> {
        self.notify(
            sender,
            recipient_id,
            NotificationKind::ConnectionAccepted,
            Some(request_id.into_uuid()),
        )
        .await
    }

    /// Push a user's new enchantment counter to their live handle.
    pub fn push_enchantment_update(&self, user_id: UserId, count: i64) {
        self.push_to_user(user_id, ServerEvent::EnchantmentUpdate { user_id, count });
    }

    async fn notify(
        &self,
        sender: &UserRef,
        recipient_id: UserId,
        kind: NotificationKind,
        related_id: Option<uuid::Uuid>,
    ) -> playnet_core::AppResult<()> {
        let notification = self
            .notifications
            .create(recipient_id, UserId::from(sender.id), kind, related_id)
            .await?;

        // If the recipient is offline the notification simply waits in
        // durable storage for their next fetch.
        self.push_to_user(
            recipient_id,
            ServerEvent::NotificationNew {
                notification,
                sender: sender.clone(),
            },
        );

        Ok(())
    }

    fn broadcast_except(&self, user_id: UserId, event: ServerEvent) {
        for handle in self.registry.all_except(user_id) {
            handle.send(event.clone());
        }
    }
}
