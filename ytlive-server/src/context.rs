//! ytlive-server/src/context.rs
//!
//! Builds every collaborator once and hands them to each other explicitly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use ytlive_common::traits::api::{Clock, LiveStatusCache, VideoStatusApi};
use ytlive_common::traits::repository_traits::{
    DeadLetterRepository, LiveEventRepository, NotificationRepository, QuotaUsageRepository,
    SubscriptionRepository, TrackedChannelRepository,
};
use ytlive_core::cache::RedisLiveCache;
use ytlive_core::config::{LeaseRenewalConfig, PollerConfig, QuotaConfig, WebSubConfig};
use ytlive_core::eventbus::UserEventBus;
use ytlive_core::platforms::youtube::YouTubeDataClient;
use ytlive_core::repositories::{
    PostgresDeadLetterRepository, PostgresLiveEventRepository, PostgresNotificationRepository,
    PostgresQuotaUsageRepository, PostgresSubscriptionRepository, PostgresTrackedChannelRepository,
};
use ytlive_core::services::{
    LiveNotifier, LiveReconciler, QuotaTracker, TrackingService, WebhookJob, WebhookQueue, webhook_queue,
};
use ytlive_core::tasks::FallbackPoller;
use ytlive_core::utils::time::SystemClock;
use ytlive_core::websub::SubscriptionManager;
use ytlive_core::{Database, DefaultHttpClient, Error, HttpClient};

use crate::Args;

/// Everything the HTTP layer and the background tasks share.
pub struct ServerContext {
    pub clock: Arc<dyn Clock>,
    pub event_bus: UserEventBus,

    pub channels: Arc<dyn TrackedChannelRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub dead_letters: Arc<dyn DeadLetterRepository>,

    pub quota: Arc<QuotaTracker>,
    pub subscription_manager: Arc<SubscriptionManager>,
    pub tracking: Arc<TrackingService>,
    pub reconciler: Arc<LiveReconciler>,
    pub poller: Arc<FallbackPoller>,

    pub webhook_queue: WebhookQueue,
    /// Taken once by the server when it spawns the worker.
    pub webhook_rx: Option<mpsc::Receiver<WebhookJob>>,

    pub websub_secret: String,
    pub lease_renewal: LeaseRenewalConfig,
}

impl ServerContext {
    pub async fn new(args: &Args) -> Result<Self, Error> {
        // 1) Postgres
        info!("Using Postgres DB URL: {}", redact(&args.database_url));
        let db = Database::new(&args.database_url).await?;
        db.migrate().await?;

        let channels: Arc<dyn TrackedChannelRepository> =
            Arc::new(PostgresTrackedChannelRepository::new(db.pool().clone()));
        let subscriptions: Arc<dyn SubscriptionRepository> =
            Arc::new(PostgresSubscriptionRepository::new(db.pool().clone()));
        let live_events: Arc<dyn LiveEventRepository> =
            Arc::new(PostgresLiveEventRepository::new(db.pool().clone()));
        let notifications: Arc<dyn NotificationRepository> =
            Arc::new(PostgresNotificationRepository::new(db.pool().clone()));
        let quota_repo: Arc<dyn QuotaUsageRepository> =
            Arc::new(PostgresQuotaUsageRepository::new(db.pool().clone()));
        let dead_letters: Arc<dyn DeadLetterRepository> =
            Arc::new(PostgresDeadLetterRepository::new(db.pool().clone()));

        // 2) Redis
        let cache: Arc<dyn LiveStatusCache> = Arc::new(RedisLiveCache::connect(&args.redis_url).await?);
        info!("Connected to Redis live-status cache");

        // 3) Outbound clients
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let http: Arc<dyn HttpClient> = Arc::new(DefaultHttpClient::with_timeout(Duration::from_secs(
            args.http_timeout_secs,
        ))?);

        let quota = Arc::new(QuotaTracker::new(
            quota_repo,
            clock.clone(),
            QuotaConfig { daily_limit: args.daily_quota },
        ));
        let api: Arc<dyn VideoStatusApi> = Arc::new(YouTubeDataClient::new(
            http.clone(),
            quota.clone(),
            args.youtube_api_key.clone(),
        ));

        let websub_config = WebSubConfig {
            hub_url: args.hub_url.clone(),
            callback_url: args.callback_url.clone(),
            secret: args.websub_secret.clone(),
            lease: Duration::from_secs(args.lease_seconds),
        };
        let subscription_manager = Arc::new(SubscriptionManager::new(
            http,
            subscriptions.clone(),
            clock.clone(),
            websub_config,
        ));

        // 4) Fan-out + live pipeline
        let event_bus = UserEventBus::new();
        let notifier = Arc::new(LiveNotifier::new(
            cache.clone(),
            channels.clone(),
            notifications.clone(),
            live_events,
            Arc::new(event_bus.clone()),
            clock.clone(),
        ));
        let reconciler = Arc::new(LiveReconciler::new(
            api.clone(),
            quota.clone(),
            notifier.clone(),
            clock.clone(),
        ));
        let poller = Arc::new(FallbackPoller::new(
            channels.clone(),
            cache,
            api,
            notifier,
            quota.clone(),
            clock.clone(),
            PollerConfig {
                interval: Duration::from_secs(args.poll_interval_secs),
                batch_size: args.poll_batch_size,
                inter_check_delay: Duration::from_secs(args.poll_delay_secs),
                ..PollerConfig::default()
            },
        ));
        let tracking = Arc::new(TrackingService::new(
            channels.clone(),
            subscriptions.clone(),
            subscription_manager.clone(),
            clock.clone(),
        ));

        let (webhook_queue, webhook_rx) = webhook_queue(args.webhook_queue_capacity);

        Ok(Self {
            clock,
            event_bus,
            channels,
            subscriptions,
            notifications,
            dead_letters,
            quota,
            subscription_manager,
            tracking,
            reconciler,
            poller,
            webhook_queue,
            webhook_rx: Some(webhook_rx),
            websub_secret: args.websub_secret.clone(),
            lease_renewal: LeaseRenewalConfig {
                interval: Duration::from_secs(args.lease_renewal_interval_secs),
                renew_ahead: Duration::from_secs(args.lease_renew_ahead_secs),
            },
        })
    }
}

/// Hides the password part of a connection URL for logging.
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            let creds = &url[scheme_end + 3..at];
            match creds.find(':') {
                Some(colon) => format!("{}{}:***{}", &url[..scheme_end + 3], &creds[..colon], &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}
