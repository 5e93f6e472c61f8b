use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::Error;
use ytlive_common::models::LiveEvent;
pub use ytlive_common::traits::repository_traits::LiveEventRepository;

#[derive(Clone)]
pub struct PostgresLiveEventRepository {
    pool: Pool<Postgres>,
}

impl PostgresLiveEventRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LiveEventRepository for PostgresLiveEventRepository {
    async fn insert_live_event(&self, event: &LiveEvent) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO live_events (
                video_id,
                channel_id,
                title,
                started_at,
                ended_at,
                checked_at,
                is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (video_id) DO NOTHING
            "#,
        )
            .bind(&event.video_id)
            .bind(&event.channel_id)
            .bind(&event.title)
            .bind(event.started_at)
            .bind(event.ended_at)
            .bind(event.checked_at)
            .bind(event.is_active)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
