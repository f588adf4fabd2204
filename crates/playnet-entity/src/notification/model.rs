//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationKind;

/// A notification targeted at a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// The recipient user.
    pub user_id: Uuid,
    /// The user whose action produced this notification.
    pub sender_id: Uuid,
    /// What happened.
    pub kind: NotificationKind,
    /// Related entity (message id or connection-request id), if any.
    pub related_id: Option<Uuid>,
    /// Whether the recipient has acknowledged this notification.
    pub is_read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check whether the notification is still unread.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}
