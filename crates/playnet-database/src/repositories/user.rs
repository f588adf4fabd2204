//! User repository implementation.
//!
//! The real-time core only reads display identity and writes the
//! presence/last-seen pair; everything else about a user belongs to the
//! surrounding platform.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use playnet_core::error::{AppError, ErrorKind};
use playnet_core::result::AppResult;
use playnet_entity::user::{PresenceState, User, UserRef};

/// Repository for user lookups and presence updates.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, avatar, presence, last_seen, created_at \
             FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    /// Find the display identity reference for a user.
    pub async fn find_ref(&self, id: Uuid) -> AppResult<Option<UserRef>> {
        sqlx::query_as::<_, UserRef>("SELECT id, username, avatar FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user reference", e)
            })
    }

    /// Set the durable presence state and last-seen timestamp for a user.
    pub async fn set_presence(
        &self,
        user_id: Uuid,
        presence: PresenceState,
        last_seen: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("UPDATE users SET presence = $2, last_seen = $3 WHERE id = $1")
            .bind(user_id)
            .bind(presence)
            .bind(last_seen)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to update user presence", e)
            })?;
        Ok(())
    }

    /// Reset every user marked online back to offline.
    ///
    /// Invoked once at startup: no connection can survive a process
    /// restart, so any online row is a leftover from an unclean shutdown.
    pub async fn reset_all_presence(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET presence = 'offline' WHERE presence <> 'offline'",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to reset presence states", e)
        })?;
        Ok(result.rows_affected())
    }
}
