use serde::Serialize;
use sqlx::prelude::FromRow;

use crate::modules::matching::model::CanonicalPair;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MatchEntity {
    pub id: i64,
    pub user_a: i64,
    pub user_b: i64,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MatchEntity {
    pub fn pair(&self) -> CanonicalPair {
        CanonicalPair { user_a: self.user_a, user_b: self.user_b }
    }
}
