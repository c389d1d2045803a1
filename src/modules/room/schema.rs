use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::modules::matching::model::CanonicalPair;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ChatRoomEntity {
    pub id: i64,
    pub user_a: i64,
    pub user_b: i64,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ChatRoomEntity {
    pub fn pair(&self) -> CanonicalPair {
        CanonicalPair { user_a: self.user_a, user_b: self.user_b }
    }

    pub fn has_participant(&self, user_id: i64) -> bool {
        self.pair().contains(user_id)
    }
}
