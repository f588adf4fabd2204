//! Persistence contracts consumed by the dispatch router.
//!
//! The router is written against these traits rather than the concrete
//! sqlx repositories so it can be exercised end-to-end with in-memory
//! fakes. The production implementations delegate to
//! `playnet-database`. All writes are single-record: a message and its
//! companion notification are two independent writes, and a crash
//! between them leaves the notification missing — an accepted gap.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use playnet_core::result::AppResult;
use playnet_core::types::id::UserId;
use playnet_database::repositories::{MessageRepository, NotificationRepository, UserRepository};
use playnet_entity::message::Message;
use playnet_entity::notification::{Notification, NotificationKind};
use playnet_entity::user::{PresenceState, UserRef};

/// Durable append-only store for private messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message and return the durable record.
    async fn create(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        content: &str,
    ) -> AppResult<Message>;
}

/// Durable store for user-targeted notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Persist a new notification and return the durable record.
    async fn create(
        &self,
        user_id: UserId,
        sender_id: UserId,
        kind: NotificationKind,
        related_id: Option<uuid::Uuid>,
    ) -> AppResult<Notification>;
}

/// User directory and durable presence updater.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Resolve a user id to its display identity, if the user exists.
    async fn find_ref(&self, user_id: UserId) -> AppResult<Option<UserRef>>;

    /// Persist the durable presence state and last-seen timestamp.
    async fn set_presence(
        &self,
        user_id: UserId,
        presence: PresenceState,
        last_seen: DateTime<Utc>,
    ) -> AppResult<()>;
}

#[async_trait]
impl MessageStore for MessageRepository {
    async fn create(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        content: &str,
    ) -> AppResult<Message> {
        MessageRepository::create(self, sender_id.into_uuid(), recipient_id.into_uuid(), content)
            .await
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(
        &self,
        user_id: UserId,
        sender_id: UserId,
        kind: NotificationKind,
        related_id: Option<uuid::Uuid>,
    ) -> AppResult<Notification> {
        NotificationRepository::create(
            self,
            user_id.into_uuid(),
            sender_id.into_uuid(),
            kind,
            related_id,
        )
        .await
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_ref(&self, user_id: UserId) -> AppResult<Option<UserRef>> {
        UserRepository::find_ref(self, user_id.into_uuid()).await
    }

    async fn set_presence(
        &self,
        user_id: UserId,
        presence: PresenceState,
        last_seen: DateTime<Utc>,
    ) -> AppResult<()> {
        UserRepository::set_presence(self, user_id.into_uuid(), presence, last_seen).await
    }
}
