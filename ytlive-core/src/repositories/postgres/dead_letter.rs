use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use crate::Error;
use ytlive_common::models::{DeadLetter, DeadLetterSource};
pub use ytlive_common::traits::repository_traits::DeadLetterRepository;

#[derive(Clone)]
pub struct PostgresDeadLetterRepository {
    pool: Pool<Postgres>,
}

impl PostgresDeadLetterRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn source_from_str(s: &str) -> DeadLetterSource {
    match s {
        "reconcile" => DeadLetterSource::Reconcile,
        _ => DeadLetterSource::WebhookIntake,
    }
}

#[async_trait]
impl DeadLetterRepository for PostgresDeadLetterRepository {
    async fn record_dead_letter(&self, letter: &DeadLetter) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO dead_letters (dead_letter_id, source, payload, error, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
            .bind(letter.dead_letter_id)
            .bind(letter.source.as_str())
            .bind(&letter.payload)
            .bind(&letter.error)
            .bind(letter.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<DeadLetter>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT dead_letter_id, source, payload, error, created_at
            FROM dead_letters
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            let source: String = r.try_get("source")?;
            out.push(DeadLetter {
                dead_letter_id: r.try_get("dead_letter_id")?,
                source: source_from_str(&source),
                payload: r.try_get("payload")?,
                error: r.try_get("error")?,
                created_at: r.try_get("created_at")?,
            });
        }
        Ok(out)
    }
}
