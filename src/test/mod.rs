//! In-memory repositories for service and gateway tests.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use crate::{
    api::error,
    modules::{
        interaction::{
            repository::InteractionRepository,
            schema::{InteractionEntity, SignalKind},
        },
        matching::{model::CanonicalPair, repository::MatchRepository, schema::MatchEntity},
        message::{model::InsertMessage, repository::MessageRepository, schema::MessageEntity},
        room::{model::RoomOverviewRow, repository::RoomRepository, schema::ChatRoomEntity},
        user::{repository::UserRepository, schema::UserEntity},
    },
};


#[derive(Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, UserEntity>,
    interactions: Vec<InteractionEntity>,
    matches: Vec<MatchEntity>,
    rooms: Vec<ChatRoomEntity>,
    messages: Vec<MessageEntity>,
    fail_next_room_insert: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn overview(&self, room: &ChatRoomEntity, viewer_id: i64) -> RoomOverviewRow {
        let in_room = self.messages.iter().filter(|m| m.room_id == room.id);
        let unread_count =
            in_room.clone().filter(|m| m.sender_id != viewer_id && !m.is_read).count() as i64;
        let last = in_room.max_by_key(|m| (m.created_at, m.id));

        RoomOverviewRow {
            id: room.id,
            user_a: room.user_a,
            user_b: room.user_b,
            is_active: room.is_active,
            created_at: room.created_at,
            unread_count,
            last_id: last.map(|m| m.id),
            last_sender_id: last.map(|m| m.sender_id),
            last_body: last.map(|m| m.body.clone()),
            last_is_read: last.map(|m| m.is_read),
            last_created_at: last.map(|m| m.created_at),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn with_users(users: &[(i64, &str, &str)]) -> Arc<Self> {
        let store = MemoryStore::default();
        {
            let mut state = store.lock();
            for &(id, first_name, last_name) in users {
                state.users.insert(
                    id,
                    UserEntity {
                        id,
                        email: format!("user{id}@example.com"),
                        first_name: first_name.to_string(),
                        last_name: last_name.to_string(),
                        city: "Lyon".to_string(),
                        likes_count: 0,
                        created_at: Utc::now(),
                    },
                );
            }
            state.next_id = 1000;
        }
        Arc::new(store)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn room_count(&self) -> usize {
        self.lock().rooms.len()
    }

    pub fn match_count(&self) -> usize {
        self.lock().matches.len()
    }

    pub fn match_for(&self, x: i64, y: i64) -> Option<MatchEntity> {
        let pair = CanonicalPair::new(x, y).ok()?;
        self.lock().matches.iter().find(|m| m.pair() == pair).cloned()
    }

    pub fn likes_count(&self, user_id: i64) -> i32 {
        self.lock().users.get(&user_id).map_or(0, |u| u.likes_count)
    }

    pub fn deactivate_match(&self, x: i64, y: i64) {
        let Ok(pair) = CanonicalPair::new(x, y) else {
            return;
        };
        for m in self.lock().matches.iter_mut().filter(|m| m.pair() == pair) {
            m.is_active = false;
        }
    }

    pub fn set_room_active(&self, room_id: i64, is_active: bool) {
        for room in self.lock().rooms.iter_mut().filter(|r| r.id == room_id) {
            room.is_active = is_active;
        }
    }

    /// The next room insert reports a unique violation without writing,
    /// as if another writer had won the race.
    pub fn fail_next_room_insert_with_conflict(&self) {
        self.lock().fail_next_room_insert = true;
    }
}

#[async_trait::async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<UserEntity>, error::SystemError> {
        let state = self.lock();
        Ok(ids.iter().filter_map(|id| state.users.get(id).cloned()).collect())
    }

    async fn increment_likes_count(&self, id: i64) -> Result<(), error::SystemError> {
        if let Some(user) = self.lock().users.get_mut(&id) {
            user.likes_count += 1;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl InteractionRepository for MemoryStore {
    async fn find_signal(
        &self,
        from_user_id: i64,
        to_user_id: i64,
    ) -> Result<Option<InteractionEntity>, error::SystemError> {
        Ok(self
            .lock()
            .interactions
            .iter()
            .find(|s| s.from_user_id == from_user_id && s.to_user_id == to_user_id)
            .cloned())
    }

    async fn upsert_signal(
        &self,
        from_user_id: i64,
        to_user_id: i64,
        kind: SignalKind,
    ) -> Result<InteractionEntity, error::SystemError> {
        let mut state = self.lock();
        if let Some(existing) = state
            .interactions
            .iter_mut()
            .find(|s| s.from_user_id == from_user_id && s.to_user_id == to_user_id)
        {
            existing.kind = kind;
            existing.created_at = Utc::now();
            return Ok(existing.clone());
        }

        let signal = InteractionEntity {
            id: state.next_id(),
            from_user_id,
            to_user_id,
            kind,
            created_at: Utc::now(),
        };
        state.interactions.push(signal.clone());
        Ok(signal)
    }

    async fn list_from(
        &self,
        user_id: i64,
        kind: SignalKind,
    ) -> Result<Vec<InteractionEntity>, error::SystemError> {
        Ok(self
            .lock()
            .interactions
            .iter()
            .rev()
            .filter(|s| s.from_user_id == user_id && s.kind == kind)
            .cloned()
            .collect())
    }

    async fn list_to(
        &self,
        user_id: i64,
        kind: SignalKind,
    ) -> Result<Vec<InteractionEntity>, error::SystemError> {
        Ok(self
            .lock()
            .interactions
            .iter()
            .rev()
            .filter(|s| s.to_user_id == user_id && s.kind == kind)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl MatchRepository for MemoryStore {
    async fn find_by_pair(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<MatchEntity>, error::SystemError> {
        Ok(self.lock().matches.iter().find(|m| m.pair() == *pair).cloned())
    }

    async fn activate(&self, pair: &CanonicalPair) -> Result<MatchEntity, error::SystemError> {
        let mut state = self.lock();
        if let Some(existing) = state.matches.iter_mut().find(|m| m.pair() == *pair) {
            existing.is_active = true;
            return Ok(existing.clone());
        }

        let created = MatchEntity {
            id: state.next_id(),
            user_a: pair.user_a,
            user_b: pair.user_b,
            is_active: true,
            created_at: Utc::now(),
        };
        state.matches.push(created.clone());
        Ok(created)
    }

    async fn deactivate(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<MatchEntity>, error::SystemError> {
        let mut state = self.lock();
        let found = state.matches.iter_mut().find(|m| m.pair() == *pair && m.is_active);
        Ok(found.map(|m| {
            m.is_active = false;
            m.clone()
        }))
    }

    async fn list_active_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<MatchEntity>, error::SystemError> {
        Ok(self
            .lock()
            .matches
            .iter()
            .rev()
            .filter(|m| m.is_active && m.pair().contains(user_id))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl RoomRepository for MemoryStore {
    async fn insert_if_absent(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<ChatRoomEntity>, error::SystemError> {
        let mut state = self.lock();
        if std::mem::take(&mut state.fail_next_room_insert) {
            return Err(error::SystemError::Conflict(None));
        }
        if state.rooms.iter().any(|r| r.pair() == *pair) {
            return Ok(None);
        }

        let room = ChatRoomEntity {
            id: state.next_id(),
            user_a: pair.user_a,
            user_b: pair.user_b,
            is_active: true,
            created_at: Utc::now(),
        };
        state.rooms.push(room.clone());
        Ok(Some(room))
    }

    async fn find_by_pair(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<ChatRoomEntity>, error::SystemError> {
        Ok(self.lock().rooms.iter().find(|r| r.pair() == *pair).cloned())
    }

    async fn find_by_id(&self, room_id: i64) -> Result<Option<ChatRoomEntity>, error::SystemError> {
        Ok(self.lock().rooms.iter().find(|r| r.id == room_id).cloned())
    }

    async fn list_active_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<RoomOverviewRow>, error::SystemError> {
        let state = self.lock();
        Ok(state
            .rooms
            .iter()
            .rev()
            .filter(|r| r.is_active && r.has_participant(user_id))
            .map(|r| state.overview(r, user_id))
            .collect())
    }

    async fn find_overview(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> Result<Option<RoomOverviewRow>, error::SystemError> {
        let state = self.lock();
        Ok(state.rooms.iter().find(|r| r.id == room_id).map(|r| state.overview(r, user_id)))
    }
}

#[async_trait::async_trait]
impl MessageRepository for MemoryStore {
    async fn create(&self, message: &InsertMessage) -> Result<MessageEntity, error::SystemError> {
        let mut state = self.lock();
        let created = MessageEntity {
            id: state.next_id(),
            room_id: message.room_id,
            sender_id: message.sender_id,
            body: message.body.clone(),
            is_read: false,
            created_at: Utc::now(),
        };
        state.messages.push(created.clone());
        Ok(created)
    }

    async fn count_in_room(&self, room_id: i64) -> Result<i64, error::SystemError> {
        Ok(self.lock().messages.iter().filter(|m| m.room_id == room_id).count() as i64)
    }

    async fn find_page(
        &self,
        room_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MessageEntity>, error::SystemError> {
        let mut page: Vec<MessageEntity> =
            self.lock().messages.iter().filter(|m| m.room_id == room_id).cloned().collect();
        page.sort_by_key(|m| (m.created_at, m.id));
        Ok(page.into_iter().skip(offset.max(0) as usize).take(limit.max(0) as usize).collect())
    }

    async fn mark_read(&self, room_id: i64, reader_id: i64) -> Result<u64, error::SystemError> {
        let mut marked = 0;
        for m in self
            .lock()
            .messages
            .iter_mut()
            .filter(|m| m.room_id == room_id && m.sender_id != reader_id && !m.is_read)
        {
            m.is_read = true;
            marked += 1;
        }
        Ok(marked)
    }

    async fn count_unread(&self, room_id: i64, user_id: i64) -> Result<i64, error::SystemError> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.room_id == room_id && m.sender_id != user_id && !m.is_read)
            .count() as i64)
    }
}
