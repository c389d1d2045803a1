/// Room Registry
///
/// Owns the 1:1 mapping between a canonical pair and its chat room, and is the
/// single place where room-scoped access is decided:
/// - `ensure_room_for` is idempotent and safe under concurrent confirmation
/// - `authorize_participant` is re-evaluated on every request and connection
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    api::error,
    modules::{
        matching::model::CanonicalPair,
        message::model::MessageResponse,
        room::{
            model::{RoomOverviewRow, RoomSummary},
            repository::RoomRepository,
            schema::ChatRoomEntity,
        },
        user::{model::UserProfile, repository::UserRepository},
    },
};

/// Bounded retries when a concurrent writer wins the pair's unique key.
const ENSURE_ROOM_ATTEMPTS: usize = 3;

pub struct RoomService<R, U>
where
    R: RoomRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    room_repo: Arc<R>,
    user_repo: Arc<U>,
}

// no `Clone` bound on the repositories, they sit behind `Arc`
impl<R, U> Clone for RoomService<R, U>
where
    R: RoomRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            room_repo: self.room_repo.clone(),
            user_repo: self.user_repo.clone(),
        }
    }
}

impl<R, U> RoomService<R, U>
where
    R: RoomRepository + Send + Sync,
    U: UserRepository + Send + Sync,
{
    pub fn with_dependencies(room_repo: Arc<R>, user_repo: Arc<U>) -> Self {
        RoomService { room_repo, user_repo }
    }

    /// Returns the pair's room, creating it on first call.
    pub async fn ensure_room_for(
        &self,
        pair: &CanonicalPair,
    ) -> Result<ChatRoomEntity, error::SystemError> {
        for attempt in 1..=ENSURE_ROOM_ATTEMPTS {
            if let Some(room) = self.room_repo.find_by_pair(pair).await? {
                return Ok(room);
            }

            match self.room_repo.insert_if_absent(pair).await {
                Ok(Some(room)) => {
                    log::info!(
                        "Chat room {} created for users {} and {}",
                        room.id,
                        pair.user_a,
                        pair.user_b
                    );
                    return Ok(room);
                }
                // lost the race; the winner's row is visible on the next read
                Ok(None) => {}
                Err(e) if e.is_conflict() => {}
                Err(e) => return Err(e),
            }

            log::debug!("Room insert for {:?} raced, retrying (attempt {})", pair, attempt);
        }

        self.room_repo
            .find_by_pair(pair)
            .await?
            .ok_or_else(|| error::SystemError::InternalError("room for pair vanished".into()))
    }

    pub async fn find_for_pair(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<ChatRoomEntity>, error::SystemError> {
        self.room_repo.find_by_pair(pair).await
    }

    /// Loads an active room and checks that `user_id` is one of its two users.
    pub async fn authorize_participant(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> Result<ChatRoomEntity, error::SystemError> {
        let room = self
            .room_repo
            .find_by_id(room_id)
            .await?
            .filter(|room| room.is_active)
            .ok_or_else(|| error::SystemError::not_found("Chat room not found"))?;

        if !room.has_participant(user_id) {
            return Err(error::SystemError::forbidden("You are not a participant of this room"));
        }

        Ok(room)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<RoomSummary>, error::SystemError> {
        let rows = self.room_repo.list_active_for_user(user_id).await?;
        self.summarize(user_id, rows).await
    }

    pub async fn get_for_user(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> Result<RoomSummary, error::SystemError> {
        self.authorize_participant(room_id, user_id).await?;

        let row = self
            .room_repo
            .find_overview(room_id, user_id)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Chat room not found"))?;

        self.summarize(user_id, vec![row])
            .await?
            .pop()
            .ok_or_else(|| error::SystemError::not_found("Chat room not found"))
    }

    async fn summarize(
        &self,
        user_id: i64,
        rows: Vec<RoomOverviewRow>,
    ) -> Result<Vec<RoomSummary>, error::SystemError> {
        let mut ids: Vec<i64> = rows.iter().flat_map(|r| [r.user_a, r.user_b]).collect();
        ids.sort_unstable();
        ids.dedup();

        let profiles: HashMap<i64, UserProfile> = self
            .user_repo
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id, UserProfile::from(u)))
            .collect();

        let summaries = rows
            .into_iter()
            .filter_map(|row| {
                let other_user = profiles.get(&row.room().pair().other(user_id))?.clone();
                let last_message = row.last_message().map(|m| {
                    let sender = profiles.get(&m.sender_id).cloned();
                    MessageResponse::with_sender(m, sender)
                });
                Some(RoomSummary {
                    id: row.id,
                    other_user,
                    last_message,
                    unread_count: row.unread_count,
                    created_at: row.created_at,
                })
            })
            .collect();

        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::MemoryStore;

    fn service(store: &Arc<MemoryStore>) -> RoomService<MemoryStore, MemoryStore> {
        RoomService::with_dependencies(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_ensure_room_is_idempotent() {
        let store = MemoryStore::with_users(&[(1, "Ann", "Lee"), (2, "Bob", "Ray")]);
        let rooms = service(&store);
        let pair = CanonicalPair::new(2, 1).unwrap();

        let first = rooms.ensure_room_for(&pair).await.unwrap();
        let second = rooms.ensure_room_for(&pair).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.room_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ensure_creates_one_room() {
        let store = MemoryStore::with_users(&[(1, "Ann", "Lee"), (2, "Bob", "Ray")]);
        let rooms = service(&store);

        let tasks: Vec<_> = (0..16)
            .map(|i| {
                let rooms = rooms.clone();
                let pair = if i % 2 == 0 {
                    CanonicalPair::new(1, 2).unwrap()
                } else {
                    CanonicalPair::new(2, 1).unwrap()
                };
                tokio::spawn(async move { rooms.ensure_room_for(&pair).await.unwrap().id })
            })
            .collect();

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap());
        }
        ids.dedup();

        assert_eq!(ids.len(), 1);
        assert_eq!(store.room_count(), 1);
    }

    #[tokio::test]
    async fn test_ensure_room_recovers_from_lost_insert_race() {
        let store = MemoryStore::with_users(&[(1, "Ann", "Lee"), (2, "Bob", "Ray")]);
        let pair = CanonicalPair::new(1, 2).unwrap();
        store.fail_next_room_insert_with_conflict();

        let room = service(&store).ensure_room_for(&pair).await.unwrap();

        assert_eq!(room.pair(), pair);
        assert_eq!(store.room_count(), 1);
    }

    #[tokio::test]
    async fn test_outsider_is_forbidden() {
        let store =
            MemoryStore::with_users(&[(1, "Ann", "Lee"), (2, "Bob", "Ray"), (3, "Cid", "Oz")]);
        let rooms = service(&store);
        let room = rooms.ensure_room_for(&CanonicalPair::new(1, 2).unwrap()).await.unwrap();

        assert!(rooms.authorize_participant(room.id, 1).await.is_ok());
        let err = rooms.authorize_participant(room.id, 3).await.unwrap_err();
        assert!(matches!(err, error::SystemError::Forbidden(_)));
        let err = rooms.authorize_participant(room.id + 100, 1).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_inactive_room_is_hidden() {
        let store = MemoryStore::with_users(&[(1, "Ann", "Lee"), (2, "Bob", "Ray")]);
        let rooms = service(&store);
        let room = rooms.ensure_room_for(&CanonicalPair::new(1, 2).unwrap()).await.unwrap();
        store.set_room_active(room.id, false);

        assert!(rooms.list_for_user(1).await.unwrap().is_empty());
        let err = rooms.authorize_participant(room.id, 1).await.unwrap_err();
        assert!(matches!(err, error::SystemError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_summary_names_the_other_user() {
        let store = MemoryStore::with_users(&[(1, "Ann", "Lee"), (2, "Bob", "Ray")]);
        let rooms = service(&store);
        let room = rooms.ensure_room_for(&CanonicalPair::new(1, 2).unwrap()).await.unwrap();

        let for_ann = rooms.get_for_user(room.id, 1).await.unwrap();
        let for_bob = rooms.list_for_user(2).await.unwrap();

        assert_eq!(for_ann.other_user.id, 2);
        assert_eq!(for_bob[0].other_user.id, 1);
        assert!(for_ann.last_message.is_none());
        assert_eq!(for_ann.unread_count, 0);
    }
}
