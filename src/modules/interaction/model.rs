use serde::Serialize;

use crate::modules::{interaction::schema::SignalKind, user::model::UserProfile};

/// One row of the history endpoints; `user` is the counterpart of the caller.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub user: UserProfile,
    pub action_type: SignalKind,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Sent,
    Received,
}
