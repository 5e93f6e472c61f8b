// src/repositories/mod.rs

pub mod postgres;

pub use postgres::tracked_channel::PostgresTrackedChannelRepository;
pub use postgres::subscription::PostgresSubscriptionRepository;
pub use postgres::live_event::PostgresLiveEventRepository;
pub use postgres::notification::PostgresNotificationRepository;
pub use postgres::quota_usage::PostgresQuotaUsageRepository;
pub use postgres::dead_letter::PostgresDeadLetterRepository;

pub use ytlive_common::traits::repository_traits::{
    DeadLetterRepository, LiveEventRepository, NotificationRepository, QuotaUsageRepository,
    SubscriptionRepository, TrackedChannelRepository,
};
