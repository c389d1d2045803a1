use crate::{
    api::error,
    modules::{
        matching::model::CanonicalPair,
        room::{model::RoomOverviewRow, schema::ChatRoomEntity},
    },
};

#[async_trait::async_trait]
pub trait RoomRepository {
    /// Creates the room for `pair` unless one exists. `None` means another
    /// writer already owns the pair.
    async fn insert_if_absent(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<ChatRoomEntity>, error::SystemError>;

    async fn find_by_pair(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<ChatRoomEntity>, error::SystemError>;

    async fn find_by_id(&self, room_id: i64) -> Result<Option<ChatRoomEntity>, error::SystemError>;

    /// Active rooms of `user_id`, newest first.
    async fn list_active_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<RoomOverviewRow>, error::SystemError>;

    async fn find_overview(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> Result<Option<RoomOverviewRow>, error::SystemError>;
}
