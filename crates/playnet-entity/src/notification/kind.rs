//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The event that produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Someone sent the recipient a connection request.
    ConnectionRequest,
    /// The recipient's connection request was accepted.
    ConnectionAccepted,
    /// The recipient received a private message.
    Message,
}

impl NotificationKind {
    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectionRequest => "connection_request",
            Self::ConnectionAccepted => "connection_accepted",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = playnet_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "connection_request" => Ok(Self::ConnectionRequest),
            "connection_accepted" => Ok(Self::ConnectionAccepted),
            "message" => Ok(Self::Message),
            _ => Err(playnet_core::AppError::validation(format!(
                "Invalid notification kind: '{s}'"
            ))),
        }
    }
}
