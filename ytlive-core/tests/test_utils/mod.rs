// File: ytlive-core/tests/test_utils/mod.rs
//
// In-memory stand-ins for Postgres, Redis, the clock and the client push
// channel, shared by the unit tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use ytlive_common::models::{
    CachedLiveStatus, ClientEvent, DeadLetter, LiveEvent, Notification, QuotaUsageRecord,
    Subscription, TrackedChannel,
};
use ytlive_common::traits::api::{Clock, LiveStatusCache, NotificationSink};
use ytlive_common::traits::repository_traits::{
    DeadLetterRepository, LiveEventRepository, NotificationRepository, QuotaUsageRepository,
    SubscriptionRepository, TrackedChannelRepository,
};
use ytlive_core::Error;

pub const CHANNEL_A: &str = "UCabcdefghijklmnopqrstuv";
pub const CHANNEL_B: &str = "UCbbbbbbbbbbbbbbbbbbbbbb";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap()
}

pub fn tracked(user_id: Uuid, channel_id: &str, title: &str) -> TrackedChannel {
    TrackedChannel {
        user_id,
        channel_id: channel_id.to_string(),
        channel_title: title.to_string(),
        thumbnail_url: None,
        added_at: t0(),
        last_checked_at: None,
    }
}

/// A pushed Atom body announcing one video.
pub fn atom_body(video_id: &str, channel_id: &str, title: &str) -> String {
    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>yt:video:{video_id}</id>
    <yt:videoId>{video_id}</yt:videoId>
    <yt:channelId>{channel_id}</yt:channelId>
    <title>{title}</title>
    <published>2024-05-01T18:00:00+00:00</published>
    <updated>2024-05-01T18:00:05+00:00</updated>
  </entry>
</feed>"#
    )
}

// ------------------------------------------------------------------
// Clock
// ------------------------------------------------------------------

pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self { now: Mutex::new(now) })
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ------------------------------------------------------------------
// Repositories
// ------------------------------------------------------------------

/// One store implementing every repository trait, so staleness can see
/// live events the same way the SQL join does.
#[derive(Default)]
pub struct MemoryStore {
    pub channels: Mutex<Vec<TrackedChannel>>,
    pub subscriptions: Mutex<HashMap<String, Subscription>>,
    pub live_events: Mutex<HashMap<String, LiveEvent>>,
    pub notifications: Mutex<Vec<Notification>>,
    pub quota: Mutex<Vec<QuotaUsageRecord>>,
    pub dead_letters: Mutex<Vec<DeadLetter>>,
    /// Channels whose tracker count fails like a dropped connection.
    pub broken_counts: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn live_event_count(&self) -> usize {
        self.live_events.lock().unwrap().len()
    }

    pub fn live_event(&self, video_id: &str) -> Option<LiveEvent> {
        self.live_events.lock().unwrap().get(video_id).cloned()
    }

    pub fn notifications_for(&self, user_id: Uuid) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn dead_letter_count(&self) -> usize {
        self.dead_letters.lock().unwrap().len()
    }
}

#[async_trait]
impl TrackedChannelRepository for MemoryStore {
    async fn track_channel(&self, channel: &TrackedChannel) -> Result<bool, Error> {
        let mut rows = self.channels.lock().unwrap();
        if rows
            .iter()
            .any(|r| r.user_id == channel.user_id && r.channel_id == channel.channel_id)
        {
            return Ok(false);
        }
        rows.push(channel.clone());
        Ok(true)
    }

    async fn untrack_channel(&self, user_id: Uuid, channel_id: &str) -> Result<bool, Error> {
        let mut rows = self.channels.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.user_id == user_id && r.channel_id == channel_id));
        Ok(rows.len() != before)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<TrackedChannel>, Error> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_trackers(&self, channel_id: &str) -> Result<Vec<TrackedChannel>, Error> {
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.channel_id == channel_id)
            .cloned()
            .collect())
    }

    async fn count_trackers(&self, channel_id: &str) -> Result<i64, Error> {
        if self.broken_counts.lock().unwrap().iter().any(|c| c == channel_id) {
            return Err(Error::Database(sqlx::Error::PoolClosed));
        }
        Ok(self.list_trackers(channel_id).await?.len() as i64)
    }

    async fn list_stale_channels(&self, stale_before: DateTime<Utc>, limit: i64) -> Result<Vec<String>, Error> {
        let rows = self.channels.lock().unwrap().clone();
        let events = self.live_events.lock().unwrap();

        let mut last_seen: HashMap<String, DateTime<Utc>> = HashMap::new();
        for row in &rows {
            let epoch = DateTime::<Utc>::UNIX_EPOCH;
            let entry = last_seen.entry(row.channel_id.clone()).or_insert(epoch);
            if let Some(at) = row.last_checked_at {
                *entry = (*entry).max(at);
            }
        }
        for event in events.values() {
            if let Some(seen) = last_seen.get_mut(&event.channel_id) {
                *seen = (*seen).max(event.checked_at);
            }
        }

        let mut stale: Vec<(String, DateTime<Utc>)> = last_seen
            .into_iter()
            .filter(|(_, seen)| *seen < stale_before)
            .collect();
        stale.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        Ok(stale
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|(id, _)| id)
            .collect())
    }

    async fn touch_last_checked(&self, channel_id: &str, checked_at: DateTime<Utc>) -> Result<(), Error> {
        for row in self.channels.lock().unwrap().iter_mut() {
            if row.channel_id == channel_id {
                row.last_checked_at = Some(checked_at);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for MemoryStore {
    async fn upsert_subscription(&self, subscription: &Subscription) -> Result<(), Error> {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.channel_id.clone(), subscription.clone());
        Ok(())
    }

    async fn get_subscription(&self, channel_id: &str) -> Result<Option<Subscription>, Error> {
        Ok(self.subscriptions.lock().unwrap().get(channel_id).cloned())
    }

    async fn delete_subscription(&self, channel_id: &str) -> Result<(), Error> {
        self.subscriptions.lock().unwrap().remove(channel_id);
        Ok(())
    }

    async fn list_expiring(&self, before: DateTime<Utc>) -> Result<Vec<Subscription>, Error> {
        let mut out: Vec<Subscription> = self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.expires_at < before)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.expires_at);
        Ok(out)
    }
}

#[async_trait]
impl LiveEventRepository for MemoryStore {
    async fn insert_live_event(&self, event: &LiveEvent) -> Result<bool, Error> {
        let mut events = self.live_events.lock().unwrap();
        if events.contains_key(&event.video_id) {
            return Ok(false);
        }
        events.insert(event.video_id.clone(), event.clone());
        Ok(true)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert_notifications(&self, notifications: &[Notification]) -> Result<(), Error> {
        self.notifications
            .lock()
            .unwrap()
            .extend_from_slice(notifications);
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid, unread_only: bool, limit: i64) -> Result<Vec<Notification>, Error> {
        Ok(self
            .notifications_for(user_id)
            .into_iter()
            .filter(|n| !unread_only || !n.read)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn mark_read(&self, user_id: Uuid, notification_id: Uuid) -> Result<bool, Error> {
        let mut rows = self.notifications.lock().unwrap();
        match rows
            .iter_mut()
            .find(|n| n.user_id == user_id && n.notification_id == notification_id)
        {
            Some(n) => {
                n.read = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl QuotaUsageRepository for MemoryStore {
    async fn record_usage(&self, record: &QuotaUsageRecord) -> Result<(), Error> {
        self.quota.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn total_for_date(&self, date: NaiveDate) -> Result<i64, Error> {
        Ok(self
            .quota
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.date == date)
            .map(|r| r.cost)
            .sum())
    }
}

#[async_trait]
impl DeadLetterRepository for MemoryStore {
    async fn record_dead_letter(&self, letter: &DeadLetter) -> Result<(), Error> {
        self.dead_letters.lock().unwrap().push(letter.clone());
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<DeadLetter>, Error> {
        let rows = self.dead_letters.lock().unwrap();
        Ok(rows.iter().rev().take(limit.max(0) as usize).cloned().collect())
    }
}

// ------------------------------------------------------------------
// Cache / sink
// ------------------------------------------------------------------

/// Keeps entries keyed like Redis; TTL is recorded, not enforced.
#[derive(Default)]
pub struct MemoryCache {
    pub entries: Mutex<HashMap<String, (CachedLiveStatus, Duration)>>,
}

impl MemoryCache {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn put(&self, channel_id: &str, status: CachedLiveStatus) {
        self.entries.lock().unwrap().insert(
            CachedLiveStatus::cache_key(channel_id),
            (status, Duration::from_secs(300)),
        );
    }

    pub fn entry(&self, channel_id: &str) -> Option<(CachedLiveStatus, Duration)> {
        self.entries
            .lock()
            .unwrap()
            .get(&CachedLiveStatus::cache_key(channel_id))
            .cloned()
    }
}

#[async_trait]
impl LiveStatusCache for MemoryCache {
    async fn get_live_status(&self, channel_id: &str) -> Result<Option<CachedLiveStatus>, Error> {
        Ok(self.entry(channel_id).map(|(status, _)| status))
    }

    async fn set_live_status(&self, channel_id: &str, status: &CachedLiveStatus, ttl: Duration) -> Result<(), Error> {
        self.entries
            .lock()
            .unwrap()
            .insert(CachedLiveStatus::cache_key(channel_id), (status.clone(), ttl));
        Ok(())
    }
}

/// Pretends every user has exactly one connected client.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<(Uuid, ClientEvent)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events_for(&self, user_id: Uuid) -> Vec<ClientEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(u, _)| *u == user_id)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify_user(&self, user_id: Uuid, event: &ClientEvent) -> usize {
        self.events.lock().unwrap().push((user_id, event.clone()));
        1
    }
}

// ------------------------------------------------------------------
// Mocks
// ------------------------------------------------------------------

use mockall::mock;
use ytlive_common::models::{ChannelLiveSearch, VideoLiveStatus};
use ytlive_common::traits::api::VideoStatusApi;
use ytlive_core::config::QuotaConfig;
use ytlive_core::http::{HttpClient, HttpResponse};
use ytlive_core::services::{LiveNotifier, LiveReconciler, QuotaTracker};

mock! {
    pub VideoApi {}
    #[async_trait]
    impl VideoStatusApi for VideoApi {
        async fn check_if_video_is_live(&self, video_id: &str) -> Result<VideoLiveStatus, Error>;
        async fn search_channel_for_live_streams(&self, channel_id: &str) -> Result<ChannelLiveSearch, Error>;
    }
}

mock! {
    pub Http {}
    #[async_trait]
    impl HttpClient for Http {
        async fn post_form(&self, url: String, form: Vec<(String, String)>) -> Result<HttpResponse, Error>;
        async fn get(&self, url: String, query: Vec<(String, String)>) -> Result<HttpResponse, Error>;
    }
}

pub fn live_status(title: &str) -> VideoLiveStatus {
    VideoLiveStatus {
        is_live: true,
        title: Some(title.to_string()),
        viewer_count: Some(42),
        started_at: Some(t0()),
    }
}

pub fn not_live() -> VideoLiveStatus {
    VideoLiveStatus {
        is_live: false,
        title: None,
        viewer_count: None,
        started_at: None,
    }
}

// ------------------------------------------------------------------
// Wiring
// ------------------------------------------------------------------

/// The live pipeline assembled over in-memory collaborators.
pub struct Pipeline {
    pub store: Arc<MemoryStore>,
    pub cache: Arc<MemoryCache>,
    pub sink: Arc<RecordingSink>,
    pub clock: Arc<FixedClock>,
    pub quota: Arc<QuotaTracker>,
    pub notifier: Arc<LiveNotifier>,
    pub reconciler: Arc<LiveReconciler>,
}

impl Pipeline {
    pub fn new(api: Arc<dyn VideoStatusApi>) -> Self {
        Self::with_quota(api, QuotaConfig::default())
    }

    pub fn with_quota(api: Arc<dyn VideoStatusApi>, quota_config: QuotaConfig) -> Self {
        let store = MemoryStore::new();
        let cache = MemoryCache::new();
        let sink = RecordingSink::new();
        let clock = FixedClock::at(t0());

        let quota = Arc::new(QuotaTracker::new(store.clone(), clock.clone(), quota_config));
        let notifier = Arc::new(LiveNotifier::new(
            cache.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            sink.clone(),
            clock.clone(),
        ));
        let reconciler = Arc::new(LiveReconciler::new(
            api,
            quota.clone(),
            notifier.clone(),
            clock.clone(),
        ));

        Self { store, cache, sink, clock, quota, notifier, reconciler }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
