use crate::{
    api::error,
    modules::interaction::{
        repository::InteractionRepository,
        schema::{InteractionEntity, SignalKind},
    },
};

#[derive(Clone)]
pub struct InteractionRepositoryPg {
    pool: sqlx::PgPool,
}

impl InteractionRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl InteractionRepository for InteractionRepositoryPg {
    async fn find_signal(
        &self,
        from_user_id: i64,
        to_user_id: i64,
    ) -> Result<Option<InteractionEntity>, error::SystemError> {
        let signal = sqlx::query_as::<_, InteractionEntity>(
            "SELECT * FROM interactions WHERE from_user_id = $1 AND to_user_id = $2",
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(signal)
    }

    async fn upsert_signal(
        &self,
        from_user_id: i64,
        to_user_id: i64,
        kind: SignalKind,
    ) -> Result<InteractionEntity, error::SystemError> {
        let signal = sqlx::query_as::<_, InteractionEntity>(
            r#"
            INSERT INTO interactions (from_user_id, to_user_id, kind)
            VALUES ($1, $2, $3)
            ON CONFLICT (from_user_id, to_user_id)
            DO UPDATE SET kind = EXCLUDED.kind, created_at = now()
            RETURNING *
            "#,
        )
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(kind)
        .fetch_one(&self.pool)
        .await?;

        Ok(signal)
    }

    async fn list_from(
        &self,
        user_id: i64,
        kind: SignalKind,
    ) -> Result<Vec<InteractionEntity>, error::SystemError> {
        let signals = sqlx::query_as::<_, InteractionEntity>(
            "SELECT * FROM interactions WHERE from_user_id = $1 AND kind = $2 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(signals)
    }

    async fn list_to(
        &self,
        user_id: i64,
        kind: SignalKind,
    ) -> Result<Vec<InteractionEntity>, error::SystemError> {
        let signals = sqlx::query_as::<_, InteractionEntity>(
            "SELECT * FROM interactions WHERE to_user_id = $1 AND kind = $2 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        Ok(signals)
    }
}
