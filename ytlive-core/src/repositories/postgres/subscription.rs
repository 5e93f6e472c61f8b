use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use crate::Error;
use ytlive_common::models::Subscription;
pub use ytlive_common::traits::repository_traits::SubscriptionRepository;

#[derive(Clone)]
pub struct PostgresSubscriptionRepository {
    pool: Pool<Postgres>,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_subscription(r: &PgRow) -> Result<Subscription, Error> {
    Ok(Subscription {
        channel_id: r.try_get("channel_id")?,
        topic_url: r.try_get("topic_url")?,
        subscribed_at: r.try_get("subscribed_at")?,
        expires_at: r.try_get("expires_at")?,
    })
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (channel_id, topic_url, subscribed_at, expires_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (channel_id) DO UPDATE
                SET topic_url     = EXCLUDED.topic_url,
                    subscribed_at = EXCLUDED.subscribed_at,
                    expires_at    = EXCLUDED.expires_at
            "#,
        )
            .bind(&subscription.channel_id)
            .bind(&subscription.topic_url)
            .bind(subscription.subscribed_at)
            .bind(subscription.expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_subscription(&self, channel_id: &str) -> Result<Option<Subscription>, Error> {
        let row = sqlx::query(
            r#"
            SELECT channel_id, topic_url, subscribed_at, expires_at
            FROM subscriptions
            WHERE channel_id = $1
            "#,
        )
            .bind(channel_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_subscription).transpose()
    }

    async fn delete_subscription(&self, channel_id: &str) -> Result<(), Error> {
        sqlx::query("DELETE FROM subscriptions WHERE channel_id = $1")
            .bind(channel_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_expiring(&self, before: DateTime<Utc>) -> Result<Vec<Subscription>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT channel_id, topic_url, subscribed_at, expires_at
            FROM subscriptions
            WHERE expires_at < $1
            ORDER BY expires_at ASC
            "#,
        )
            .bind(before)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_subscription).collect()
    }
}
