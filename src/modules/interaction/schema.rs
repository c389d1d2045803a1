use serde::{Deserialize, Serialize};
use sqlx::prelude::{FromRow, Type};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Type, Serialize, Deserialize)]
#[sqlx(type_name = "signal_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    View,
    Like,
    Dislike,
}

/// The live signal for one ordered `(from, to)` pair. A newer signal of any
/// kind overwrites the row in place.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct InteractionEntity {
    pub id: i64,
    pub from_user_id: i64,
    pub to_user_id: i64,
    pub kind: SignalKind,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
