use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::modules::{
    message::{model::MessageResponse, schema::MessageEntity},
    room::schema::ChatRoomEntity,
    user::model::UserProfile,
};

/// A room joined with the caller's unread count and the latest message.
#[derive(Debug, Clone, FromRow)]
pub struct RoomOverviewRow {
    pub id: i64,
    pub user_a: i64,
    pub user_b: i64,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub unread_count: i64,
    pub last_id: Option<i64>,
    pub last_sender_id: Option<i64>,
    pub last_body: Option<String>,
    pub last_is_read: Option<bool>,
    pub last_created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl RoomOverviewRow {
    pub fn room(&self) -> ChatRoomEntity {
        ChatRoomEntity {
            id: self.id,
            user_a: self.user_a,
            user_b: self.user_b,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }

    pub fn last_message(&self) -> Option<MessageEntity> {
        match (self.last_id, self.last_sender_id, &self.last_body, self.last_created_at) {
            (Some(id), Some(sender_id), Some(body), Some(created_at)) => Some(MessageEntity {
                id,
                room_id: self.id,
                sender_id,
                body: body.clone(),
                is_read: self.last_is_read.unwrap_or(false),
                created_at,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub id: i64,
    pub other_user: UserProfile,
    pub last_message: Option<MessageResponse>,
    pub unread_count: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
