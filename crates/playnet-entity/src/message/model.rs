//! Private message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A point-to-point message between two users.
///
/// Immutable once created; only `is_read` mutates, via the
/// conversation-level mark-read flow owned by the HTTP layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// The sending user.
    pub sender_id: Uuid,
    /// The receiving user.
    pub recipient_id: Uuid,
    /// Message text. Non-empty after trimming.
    pub content: String,
    /// Whether the recipient has read this message.
    pub is_read: bool,
    /// When the message was created.
    pub created_at: DateTime<Utc>,
}
