use serde::{Deserialize, Serialize};

use crate::modules::user::schema::UserEntity;

/// Public view of another user embedded in rooms, matches, messages and history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub city: String,
    pub likes_count: i32,
}

impl From<UserEntity> for UserProfile {
    fn from(user: UserEntity) -> Self {
        UserProfile {
            id: user.id,
            display_name: user.display_name(),
            first_name: user.first_name,
            last_name: user.last_name,
            city: user.city,
            likes_count: user.likes_count,
        }
    }
}
