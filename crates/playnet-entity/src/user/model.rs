//! User entity model.
//!
//! The full platform owns many more profile columns; this crate carries
//! only the slice the real-time core reads (display identity) and writes
//! (presence, last-seen).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::presence::PresenceState;

/// A registered user, as seen by the real-time core.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Avatar image URL (optional).
    pub avatar: Option<String>,
    /// Durable presence state.
    pub presence: PresenceState,
    /// Last time the user was seen connected.
    pub last_seen: DateTime<Utc>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Display identity reference for pushes and populated payloads.
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

/// Minimal user identity embedded in outbound events ("populated sender").
///
/// Serializes in the platform's document convention: the identifier field
/// is named `_id` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserRef {
    /// Unique user identifier.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Username for display.
    pub username: String,
    /// Avatar image URL (optional).
    pub avatar: Option<String>,
}
