use crate::{api::error, modules::user::schema::UserEntity};

#[async_trait::async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<UserEntity>, error::SystemError>;

    async fn find_many(&self, ids: &[i64]) -> Result<Vec<UserEntity>, error::SystemError>;

    /// Bumps the received-likes counter of `id`.
    async fn increment_likes_count(&self, id: i64) -> Result<(), error::SystemError>;
}
