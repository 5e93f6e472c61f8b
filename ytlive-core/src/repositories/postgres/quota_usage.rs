use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Row};

use crate::Error;
use ytlive_common::models::QuotaUsageRecord;
pub use ytlive_common::traits::repository_traits::QuotaUsageRepository;

#[derive(Clone)]
pub struct PostgresQuotaUsageRepository {
    pool: Pool<Postgres>,
}

impl PostgresQuotaUsageRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuotaUsageRepository for PostgresQuotaUsageRepository {
    async fn record_usage(&self, record: &QuotaUsageRecord) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO quota_usage (endpoint, cost, user_id, timestamp, date)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
            .bind(&record.endpoint)
            .bind(record.cost)
            .bind(record.user_id)
            .bind(record.timestamp)
            .bind(record.date)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn total_for_date(&self, date: NaiveDate) -> Result<i64, Error> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(cost), 0)::BIGINT AS total FROM quota_usage WHERE date = $1",
        )
            .bind(date)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("total")?)
    }
}
