use crate::{
    api::error,
    modules::{
        matching::model::CanonicalPair,
        room::{model::RoomOverviewRow, repository::RoomRepository, schema::ChatRoomEntity},
    },
};

const OVERVIEW_SELECT: &str = r#"
    SELECT
        r.id,
        r.user_a,
        r.user_b,
        r.is_active,
        r.created_at,

        (
            SELECT COUNT(*)
            FROM chat_messages u
            WHERE u.room_id = r.id AND u.sender_id <> $1 AND NOT u.is_read
        ) AS unread_count,

        m.id AS last_id,
        m.sender_id AS last_sender_id,
        m.body AS last_body,
        m.is_read AS last_is_read,
        m.created_at AS last_created_at
    FROM chat_rooms r
    LEFT JOIN LATERAL (
        SELECT id, sender_id, body, is_read, created_at
        FROM chat_messages
        WHERE room_id = r.id
        ORDER BY created_at DESC, id DESC
        LIMIT 1
    ) m ON true
"#;

#[derive(Clone)]
pub struct RoomRepositoryPg {
    pool: sqlx::PgPool,
}

impl RoomRepositoryPg {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RoomRepository for RoomRepositoryPg {
    async fn insert_if_absent(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<ChatRoomEntity>, error::SystemError> {
        let room = sqlx::query_as::<_, ChatRoomEntity>(
            r#"
            INSERT INTO chat_rooms (user_a, user_b)
            VALUES ($1, $2)
            ON CONFLICT (user_a, user_b) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(pair.user_a)
        .bind(pair.user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    async fn find_by_pair(
        &self,
        pair: &CanonicalPair,
    ) -> Result<Option<ChatRoomEntity>, error::SystemError> {
        let room = sqlx::query_as::<_, ChatRoomEntity>(
            "SELECT * FROM chat_rooms WHERE user_a = $1 AND user_b = $2",
        )
        .bind(pair.user_a)
        .bind(pair.user_b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(room)
    }

    async fn find_by_id(&self, room_id: i64) -> Result<Option<ChatRoomEntity>, error::SystemError> {
        let room = sqlx::query_as::<_, ChatRoomEntity>("SELECT * FROM chat_rooms WHERE id = $1")
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(room)
    }

    async fn list_active_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<RoomOverviewRow>, error::SystemError> {
        let query = format!(
            "{OVERVIEW_SELECT} WHERE (r.user_a = $1 OR r.user_b = $1) AND r.is_active ORDER BY r.created_at DESC"
        );

        let rooms = sqlx::query_as::<_, RoomOverviewRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rooms)
    }

    async fn find_overview(
        &self,
        room_id: i64,
        user_id: i64,
    ) -> Result<Option<RoomOverviewRow>, error::SystemError> {
        let query = format!("{OVERVIEW_SELECT} WHERE r.id = $2");

        let room = sqlx::query_as::<_, RoomOverviewRow>(&query)
            .bind(user_id)
            .bind(room_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(room)
    }
}
