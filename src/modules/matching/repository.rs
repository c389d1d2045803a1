use crate::{
    api::error,
    modules::matching::{model::CanonicalPair, schema::MatchEntity},
};

#[async_trait::async_trait]
pub trait MatchRepository {
    async fn find_by_pair(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<MatchEntity>, error::SystemError>;

    /// Creates the pair's match or flips an existing row back to active.
    /// The same row is reused across like/dislike cycles.
    async fn activate(&self, pair: &CanonicalPair) -> Result<MatchEntity, error::SystemError>;

    /// Marks an active match inactive. `None` when there was nothing active.
    async fn deactivate(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<MatchEntity>, error::SystemError>;

    async fn list_active_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<MatchEntity>, error::SystemError>;
}
