use crate::{
    api::error,
    modules::message::{model::InsertMessage, repository::MessageRepository, schema::MessageEntity},
};

#[derive(Clone)]
pub struct MessageRepositoryPg {
    pool: sqlx::PgPool,
}

impl MessageRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MessageRepository for MessageRepositoryPg {
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError> {
        let message = sqlx::query_as::<_, MessageEntity>(
            "INSERT INTO chat_messages (room_id, sender_id, body) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(message.room_id)
        .bind(message.sender_id)
        .bind(&message.body)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn count_in_room(&self, room_id: i64) -> Result<i64, error::SystemError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages WHERE room_id = $1")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn find_page(
        &self,
        room_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        // index on (room_id, created_at, id)
        let messages = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT * FROM chat_messages
            WHERE room_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(room_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn mark_read(&self, room_id: i64, reader_id: i64) -> Result<u64, error::SystemError> {
        let result = sqlx::query(
            "UPDATE chat_messages SET is_read = TRUE WHERE room_id = $1 AND sender_id <> $2 AND NOT is_read",
        )
        .bind(room_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self, room_id: i64, user_id: i64) -> Result<i64, error::SystemError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_messages WHERE room_id = $1 AND sender_id <> $2 AND NOT is_read",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
