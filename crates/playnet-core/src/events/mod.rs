//! Domain events emitted by the surrounding social platform.
//!
//! The HTTP layer owns connection-request records and enchantment
//! counters; when one of those changes it hands the corresponding event
//! to the real-time engine for notification persistence and push
//! delivery.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events produced by the social flows outside the real-time core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SocialEvent {
    /// A user sent a connection request to another user.
    ConnectionRequestCreated {
        /// The connection-request record ID.
        request_id: Uuid,
        /// The user who sent the request.
        from: Uuid,
        /// The user who received the request.
        to: Uuid,
    },
    /// A user accepted a pending connection request.
    ConnectionRequestAccepted {
        /// The connection-request record ID.
        request_id: Uuid,
        /// The user who accepted.
        from: Uuid,
        /// The original requester, who is notified.
        to: Uuid,
    },
    /// A user's enchantment counter changed.
    EnchantmentChanged {
        /// The user whose counter changed.
        user_id: Uuid,
        /// The new counter value.
        count: i64,
    },
}
