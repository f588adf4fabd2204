//! Inbound and outbound real-time event definitions.
//!
//! Every frame on the wire is JSON of the form
//! `{"event": "<name>", "data": {…}}`. Both directions are closed tagged
//! unions so the dispatch router can be exhaustively matched and tested
//! without a live transport. Data fields follow the platform's document
//! convention: camelCase names, record ids as `_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use playnet_core::types::id::{MessageId, UserId};
use playnet_entity::notification::Notification;
use playnet_entity::user::UserRef;

/// Events sent by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Send a private message to another user.
    #[serde(rename = "message:private")]
    MessagePrivate {
        /// The receiving user.
        recipient_id: UserId,
        /// Message text.
        content: String,
    },
    /// The client started typing to a user.
    #[serde(rename = "typing:start")]
    TypingStart {
        /// The user being typed to.
        recipient_id: UserId,
    },
    /// The client stopped typing to a user.
    #[serde(rename = "typing:stop")]
    TypingStop {
        /// The user being typed to.
        recipient_id: UserId,
    },
}

/// Events sent by the server to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Deliver an inbound message to its recipient.
    #[serde(rename = "message:receive")]
    MessageReceive {
        /// The persisted message ID.
        #[serde(rename = "_id")]
        id: MessageId,
        /// The sending user.
        sender_id: UserId,
        /// The sender's username for display.
        sender_name: String,
        /// Message text.
        content: String,
        /// When the message was persisted.
        created_at: DateTime<Utc>,
    },
    /// Confirm a send back to its origin, carrying the durable record's
    /// id and timestamp so the client can reconcile its optimistic insert.
    #[serde(rename = "message:sent")]
    MessageSent {
        /// The persisted message ID.
        #[serde(rename = "_id")]
        id: MessageId,
        /// The receiving user.
        recipient_id: UserId,
        /// Message text.
        content: String,
        /// When the message was persisted.
        created_at: DateTime<Utc>,
    },
    /// Relay another user's typing state.
    #[serde(rename = "typing:indicator")]
    TypingIndicator {
        /// The typing user.
        user_id: UserId,
        /// The typing user's username.
        username: String,
        /// Whether they started (`true`) or stopped (`false`) typing.
        is_typing: bool,
    },
    /// Push a freshly created notification with its populated sender.
    #[serde(rename = "notification:new")]
    NotificationNew {
        /// The persisted notification record.
        notification: Notification,
        /// Display identity of the user who caused it.
        sender: UserRef,
    },
    /// A user came online.
    #[serde(rename = "user:online")]
    UserOnline {
        /// The user who connected.
        user_id: UserId,
        /// Their username.
        username: String,
    },
    /// A user went offline.
    #[serde(rename = "user:offline")]
    UserOffline {
        /// The user who disconnected.
        user_id: UserId,
        /// Their username.
        username: String,
    },
    /// Push a user's new enchantment counter value.
    #[serde(rename = "enchantment:update")]
    EnchantmentUpdate {
        /// The user whose counter changed.
        user_id: UserId,
        /// The new counter value.
        count: i64,
    },
    /// An operation on this connection failed.
    #[serde(rename = "error")]
    Error {
        /// Human-readable failure description.
        message: String,
    },
}
