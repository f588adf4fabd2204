//! Message repository implementation.
//!
//! Messages are append-only: rows are inserted by the dispatch router and
//! never mutated except for the conversation-level read flag, which the
//! HTTP layer flips when the recipient opens the conversation.

use sqlx::PgPool;
use uuid::Uuid;

use playnet_core::error::{AppError, ErrorKind};
use playnet_core::result::AppResult;
use playnet_core::types::pagination::{PageRequest, PageResponse};
use playnet_entity::message::Message;

/// Repository for private message persistence and conversation queries.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a new message. Returns the persisted row.
    pub async fn create(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: &str,
    ) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (sender_id, recipient_id, content) \
             VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))
    }

    /// List the conversation between two users, oldest first.
    ///
    /// Matches both directions of the pair so either participant sees the
    /// same thread.
    pub async fn find_conversation(
        &self,
        user_a: Uuid,
        user_b: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Message>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages \
             WHERE (sender_id = $1 AND recipient_id = $2) \
                OR (sender_id = $2 AND recipient_id = $1)",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count messages", e))?;

        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages \
             WHERE (sender_id = $1 AND recipient_id = $2) \
                OR (sender_id = $2 AND recipient_id = $1) \
             ORDER BY created_at ASC LIMIT $3 OFFSET $4",
        )
        .bind(user_a)
        .bind(user_b)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list conversation", e))?;

        Ok(PageResponse::new(
            messages,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Count unread messages from one sender to one recipient.
    pub async fn count_unread(&self, recipient_id: Uuid, sender_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages \
             WHERE recipient_id = $1 AND sender_id = $2 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .bind(sender_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count unread messages", e)
        })
    }

    /// Mark every message from `sender_id` to `recipient_id` as read.
    ///
    /// Returns the number of rows flipped.
    pub async fn mark_conversation_read(
        &self,
        recipient_id: Uuid,
        sender_id: Uuid,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE \
             WHERE recipient_id = $1 AND sender_id = $2 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .bind(sender_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark conversation read", e)
        })?;
        Ok(result.rows_affected())
    }
}
