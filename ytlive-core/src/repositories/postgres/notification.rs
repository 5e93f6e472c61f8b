use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use crate::Error;
use ytlive_common::models::Notification;
pub use ytlive_common::traits::repository_traits::NotificationRepository;

#[derive(Clone)]
pub struct PostgresNotificationRepository {
    pool: Pool<Postgres>,
}

impl PostgresNotificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_notification(r: &PgRow) -> Result<Notification, Error> {
    Ok(Notification {
        notification_id: r.try_get("notification_id")?,
        user_id: r.try_get("user_id")?,
        channel_id: r.try_get("channel_id")?,
        video_id: r.try_get("video_id")?,
        message: r.try_get("message")?,
        read: r.try_get("read")?,
        created_at: r.try_get("created_at")?,
    })
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn insert_notifications(&self, notifications: &[Notification]) -> Result<(), Error> {
        if notifications.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for n in notifications {
            sqlx::query(
                r#"
                INSERT INTO notifications (
                    notification_id,
                    user_id,
                    channel_id,
                    video_id,
                    message,
                    read,
                    created_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
                .bind(n.notification_id)
                .bind(n.user_id)
                .bind(&n.channel_id)
                .bind(&n.video_id)
                .bind(&n.message)
                .bind(n.read)
                .bind(n.created_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid, unread_only: bool, limit: i64) -> Result<Vec<Notification>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT notification_id, user_id, channel_id, video_id, message, read, created_at
            FROM notifications
            WHERE user_id = $1
              AND ($2 = FALSE OR read = FALSE)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
            .bind(user_id)
            .bind(unread_only)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_notification).collect()
    }

    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool, Error> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE user_id = $1 AND notification_id = $2",
        )
            .bind(user_id)
            .bind(notification_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
