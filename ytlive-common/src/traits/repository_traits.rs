use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{DeadLetter, LiveEvent, Notification, QuotaUsageRecord, Subscription, TrackedChannel};

#[async_trait]
pub trait TrackedChannelRepository: Send + Sync {
    /// Inserts the row; returns `false` when (user, channel) was already tracked.
    async fn track_channel(&self, channel: &TrackedChannel) -> Result<bool, Error>;

    /// Returns `false` when nothing was deleted.
    async fn untrack_channel(&self, user_id: Uuid, channel_id: &str) -> Result<bool, Error>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TrackedChannel>, Error>;

    /// Every user's tracking row for a channel.
    async fn list_trackers(&self, channel_id: &str) -> Result<Vec<TrackedChannel>, Error>;

    async fn count_trackers(&self, channel_id: &str) -> Result<i64, Error>;

    /// Distinct tracked channel ids whose newest check (live event or
    /// `last_checked_at`) is older than `stale_before`, oldest first.
    async fn list_stale_channels(
        &self,
        stale_before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<String>, Error>;

    /// Sets `last_checked_at` on every user's row for the channel.
    async fn touch_last_checked(&self, channel_id: &str, checked_at: DateTime<Utc>) -> Result<(), Error>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert or extend the lease for `subscription.channel_id`.
    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<(), Error>;
    async fn get_subscription(&self, channel_id: &str) -> Result<Option<Subscription>, Error>;
    async fn delete_subscription(&self, channel_id: &str) -> Result<(), Error>;
    async fn list_expiring(&self, before: DateTime<Utc>) -> Result<Vec<Subscription>, Error>;
}

#[async_trait]
pub trait LiveEventRepository: Send + Sync {
    /// Conflict-ignoring insert keyed by `video_id`. Returns `true` when a new
    /// row was written.
    async fn insert_live_event(&self, event: &LiveEvent) -> Result<bool, Error>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_notifications(&self, notifications: &[Notification]) -> Result<(), Error>;
    async fn list_for_user(&self, user_id: Uuid, unread_only: bool, limit: i64) -> Result<Vec<Notification>, Error>;
    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool, Error>;
}

#[async_trait]
pub trait QuotaUsageRepository: Send + Sync {
    async fn record_usage(&self, record: &QuotaUsageRecord) -> Result<(), Error>;
    async fn total_for_date(&self, date: NaiveDate) -> Result<i64, Error>;
}

#[async_trait]
pub trait DeadLetterRepository: Send + Sync {
    async fn record_dead_letter(&self, letter: &DeadLetter) -> Result<(), Error>;
    async fn list_recent(&self, limit: i64) -> Result<Vec<DeadLetter>, Error>;
}
