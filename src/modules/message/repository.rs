use crate::{
    api::error,
    modules::message::{model::InsertMessage, schema::MessageEntity},
};

#[async_trait::async_trait]
pub trait MessageRepository {
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError>;

    async fn count_in_room(&self, room_id: i64) -> Result<i64, error::SystemError>;

    /// Oldest first: `created_at`, then insertion id.
    async fn find_page(
        &self,
        room_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError>;

    /// Flags every message in the room not sent by `reader_id` as read.
    async fn mark_read(&self, room_id: i64, reader_id: i64) -> Result<u64, error::SystemError>;

    async fn count_unread(&self, room_id: i64, user_id: i64) -> Result<i64, error::SystemError>;
}
