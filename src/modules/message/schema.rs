use serde::Serialize;
use sqlx::prelude::FromRow;

/// Immutable once written, except `is_read`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MessageEntity {
    pub id: i64,
    pub room_id: i64,
    pub sender_id: i64,
    pub body: String,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
