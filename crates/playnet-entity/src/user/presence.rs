//! Presence state enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Durable presence state of a user.
///
/// `Online` is owned by the presence registry: a user is `Online` if and
/// only if they hold a live registered connection in this process.
/// `Away` and `Busy` are user-selected variants of being connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_presence", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    /// User has an active connection.
    Online,
    /// User has no active connection.
    Offline,
    /// User is connected but marked themselves away.
    Away,
    /// User is connected and does not want to be disturbed.
    Busy,
}

impl PresenceState {
    /// Whether this state implies an active connection.
    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Offline)
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Away => "away",
            Self::Busy => "busy",
        }
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PresenceState {
    type Err = playnet_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "away" => Ok(Self::Away),
            "busy" => Ok(Self::Busy),
            _ => Err(playnet_core::AppError::validation(format!(
                "Invalid presence state: '{s}'. Expected one of: online, offline, away, busy"
            ))),
        }
    }
}
