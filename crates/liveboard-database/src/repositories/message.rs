//! Message store on PostgreSQL.

use async_trait::async_trait;
use sqlx::PgPool;

use liveboard_core::result::AppResult;
use liveboard_core::types::{MessageId, UserId};
use liveboard_entity::{CreateMessage, Message, UnreadCount};

use super::store_error;
use crate::store::MessageStore;

/// [`MessageStore`] backed by the `messages` table.
#[derive(Debug, Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Create a new message store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn create(&self, input: CreateMessage) -> AppResult<Message> {
        sqlx::query_as::<_, Message>(
            "INSERT INTO messages (id, text, sender_id, recipient_id, is_private, is_read) \
             VALUES ($1, $2, $3, $4, $5, FALSE) \
             RETURNING *",
        )
        .bind(MessageId::ordered())
        .bind(&input.text)
        .bind(input.sender_id)
        .bind(input.recipient_id)
        .bind(input.recipient_id.is_some())
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("Failed to create message"))
    }

    async fn find_by_id(&self, id: MessageId) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error("Failed to find message"))
    }

    async fn find_conversation(&self, a: UserId, b: UserId) -> AppResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            "SELECT * FROM messages \
             WHERE is_private \
               AND ((sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1)) \
             ORDER BY created_at ASC, id ASC",
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("Failed to load conversation"))
    }

    async fn find_recent_broadcasts(&self, limit: usize) -> AppResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE NOT is_private \
             ORDER BY created_at DESC, id DESC LIMIT $1",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("Failed to load broadcast history"))
    }

    async fn find_latest_per_peer(&self, user: UserId) -> AppResult<Vec<Message>> {
        sqlx::query_as::<_, Message>(
            "SELECT DISTINCT ON (CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END) * \
             FROM messages \
             WHERE is_private AND (sender_id = $1 OR recipient_id = $1) \
             ORDER BY CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END, \
                      created_at DESC, id DESC",
        )
        .bind(user)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("Failed to load latest messages"))
    }

    async fn count_unread(&self, sender: UserId, recipient: UserId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages \
             WHERE is_private AND NOT is_read AND sender_id = $1 AND recipient_id = $2",
        )
        .bind(sender)
        .bind(recipient)
        .fetch_one(&self.pool)
        .await
        .map_err(store_error("Failed to count unread messages"))?;

        Ok(count.max(0) as u64)
    }

    async fn mark_read(&self, sender: UserId, recipient: UserId) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = TRUE, updated_at = clock_timestamp() \
             WHERE is_private AND NOT is_read AND sender_id = $1 AND recipient_id = $2",
        )
        .bind(sender)
        .bind(recipient)
        .execute(&self.pool)
        .await
        .map_err(store_error("Failed to mark messages read"))?;

        Ok(result.rows_affected())
    }

    async fn unread_counts_by_sender(&self, recipient: UserId) -> AppResult<Vec<UnreadCount>> {
        let rows: Vec<(UserId, i64)> = sqlx::query_as(
            "SELECT sender_id, COUNT(*) FROM messages \
             WHERE is_private AND NOT is_read AND recipient_id = $1 \
             GROUP BY sender_id",
        )
        .bind(recipient)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error("Failed to aggregate unread counts"))?;

        Ok(rows
            .into_iter()
            .map(|(user_id, count)| UnreadCount {
                user_id,
                count: count.max(0) as u64,
            })
            .collect())
    }

    async fn update_text(
        &self,
        id: MessageId,
        sender: UserId,
        text: &str,
    ) -> AppResult<Option<Message>> {
        sqlx::query_as::<_, Message>(
            "UPDATE messages SET text = $3, updated_at = clock_timestamp() \
             WHERE id = $1 AND sender_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(sender)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error("Failed to update message"))
    }

    async fn delete(&self, id: MessageId, sender: UserId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1 AND sender_id = $2")
            .bind(id)
            .bind(sender)
            .execute(&self.pool)
            .await
            .map_err(store_error("Failed to delete message"))?;

        Ok(result.rows_affected() > 0)
    }
}
