use crate::{
    api::error,
    modules::interaction::schema::{InteractionEntity, SignalKind},
};

#[async_trait::async_trait]
pub trait InteractionRepository {
    async fn find_signal(
        &self,
        from_user_id: i64,
        to_user_id: i64,
    ) -> Result<Option<InteractionEntity>, error::SystemError>;

    /// Inserts or overwrites the signal for the ordered pair.
    async fn upsert_signal(
        &self,
        from_user_id: i64,
        to_user_id: i64,
        kind: SignalKind,
    ) -> Result<InteractionEntity, error::SystemError>;

    async fn list_from(
        &self,
        user_id: i64,
        kind: SignalKind,
    ) -> Result<Vec<InteractionEntity>, error::SystemError>;

    async fn list_to(
        &self,
        user_id: i64,
        kind: SignalKind,
    ) -> Result<Vec<InteractionEntity>, error::SystemError>;
}
