use crate::{
    api::error,
    modules::matching::{model::CanonicalPair, repository::MatchRepository, schema::MatchEntity},
};

#[derive(Clone)]
pub struct MatchRepositoryPg {
    pool: sqlx::PgPool,
}

impl MatchRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl MatchRepository for MatchRepositoryPg {
    async fn find_by_pair(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<MatchEntity>, error::SystemError> {
        let found = sqlx::query_as::<_, MatchEntity>(
            "SELECT * FROM matches WHERE user_a = $1 AND user_b = $2",
        )
        .bind(pair.user_a)
        .bind(pair.user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found)
    }

    async fn activate(&self, pair: &CanonicalPair) -> Result<MatchEntity, error::SystemError> {
        let activated = sqlx::query_as::<_, MatchEntity>(
            r#"
            INSERT INTO matches (user_a, user_b, is_active)
            VALUES ($1, $2, TRUE)
            ON CONFLICT (user_a, user_b)
            DO UPDATE SET is_active = TRUE
            RETURNING *
            "#,
        )
        .bind(pair.user_a)
        .bind(pair.user_b)
        .fetch_one(&self.pool)
        .await?;

        Ok(activated)
    }

    async fn deactivate(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<MatchEntity>, error::SystemError> {
        let deactivated = sqlx::query_as::<_, MatchEntity>(
            r#"
            UPDATE matches
            SET is_active = FALSE
            WHERE user_a = $1 AND user_b = $2 AND is_active
            RETURNING *
            "#,
        )
        .bind(pair.user_a)
        .bind(pair.user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deactivated)
    }

    async fn list_active_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<MatchEntity>, error::SystemError> {
        let matches = sqlx::query_as::<_, MatchEntity>(
            r#"
            SELECT * FROM matches
            WHERE (user_a = $1 OR user_b = $1) AND is_active
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(matches)
    }
}
