use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::Error;
use ytlive_common::models::TrackedChannel;
pub use ytlive_common::traits::repository_traits::TrackedChannelRepository;

#[derive(Clone)]
pub struct PostgresTrackedChannelRepository {
    pool: Pool<Postgres>,
}

impl PostgresTrackedChannelRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_tracked_channel(r: &PgRow) -> Result<TrackedChannel, Error> {
    Ok(TrackedChannel {
        user_id: r.try_get("user_id")?,
        channel_id: r.try_get("channel_id")?,
        channel_title: r.try_get("channel_title")?,
        thumbnail_url: r.try_get("thumbnail_url")?,
        added_at: r.try_get("added_at")?,
        last_checked_at: r.try_get("last_checked_at")?,
    })
}

#[async_trait]
impl TrackedChannelRepository for PostgresTrackedChannelRepository {
    async fn track_channel(&self, channel: &TrackedChannel) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO tracked_channels (
                user_id,
                channel_id,
                channel_title,
                thumbnail_url,
                added_at,
                last_checked_at
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, channel_id) DO NOTHING
            "#,
        )
            .bind(channel.user_id)
            .bind(&channel.channel_id)
            .bind(&channel.channel_title)
            .bind(&channel.thumbnail_url)
            .bind(channel.added_at)
            .bind(channel.last_checked_at)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn untrack_channel(&self, user_id: Uuid, channel_id: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            "DELETE FROM tracked_channels WHERE user_id = $1 AND channel_id = $2",
        )
            .bind(user_id)
            .bind(channel_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TrackedChannel>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, channel_id, channel_title, thumbnail_url, added_at, last_checked_at
            FROM tracked_channels
            WHERE user_id = $1
            ORDER BY added_at ASC
            "#,
        )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_tracked_channel).collect()
    }

    async fn list_trackers(&self, channel_id: &str) -> Result<Vec<TrackedChannel>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, channel_id, channel_title, thumbnail_url, added_at, last_checked_at
            FROM tracked_channels
            WHERE channel_id = $1
            "#,
        )
            .bind(channel_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_tracked_channel).collect()
    }

    async fn count_trackers(&self, channel_id: &str) -> Result<i64, Error> {
        let row = sqlx::query("SELECT COUNT(*) AS trackers FROM tracked_channels WHERE channel_id = $1")
            .bind(channel_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("trackers")?)
    }

    async fn list_stale_channels(
        &self,
        stale_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<String>, Error> {
        // GREATEST skips NULLs, so a channel with neither a live event nor a
        // previous poll falls back to the epoch and sorts first.
        let rows = sqlx::query(
            r#"
            SELECT tc.channel_id,
                   COALESCE(
                       GREATEST(MAX(le.checked_at), MAX(tc.last_checked_at)),
                       'epoch'::timestamptz
                   ) AS last_seen
            FROM tracked_channels tc
            LEFT JOIN live_events le ON le.channel_id = tc.channel_id
            GROUP BY tc.channel_id
            HAVING COALESCE(
                       GREATEST(MAX(le.checked_at), MAX(tc.last_checked_at)),
                       'epoch'::timestamptz
                   ) < $1
            ORDER BY last_seen ASC
            LIMIT $2
            "#,
        )
            .bind(stale_before)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(r.try_get("channel_id")?);
        }
        Ok(out)
    }

    async fn touch_last_checked(&self, channel_id: &str, checked_at: DateTime<Utc>) -> Result<(), Error> {
        sqlx::query("UPDATE tracked_channels SET last_checked_at = $1 WHERE channel_id = $2")
            .bind(checked_at)
            .bind(channel_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
