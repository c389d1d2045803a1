use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserEntity {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub likes_count: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl UserEntity {
    /// "First Last", falling back to the email when both names are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}
