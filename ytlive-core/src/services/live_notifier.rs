//! The one place a channel gets marked live. Both the webhook reconciler and
//! the fallback poller end up here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::LIVE_STATUS_TTL;
use crate::Error;
use ytlive_common::models::{CachedLiveStatus, ClientEvent, LiveEvent, Notification};
use ytlive_common::traits::api::{Clock, LiveStatusCache, NotificationSink};
use ytlive_common::traits::repository_traits::{
    LiveEventRepository, NotificationRepository, TrackedChannelRepository,
};

/// A confirmed live broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveSighting {
    pub channel_id: String,
    pub video_id: String,
    pub title: String,
    pub started_at: DateTime<Utc>,
}

/// What `mark_live` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkLiveReport {
    pub trackers: usize,
    pub delivered: usize,
    pub new_live_event: bool,
}

pub struct LiveNotifier {
    cache: Arc<dyn LiveStatusCache>,
    channels: Arc<dyn TrackedChannelRepository>,
    notifications: Arc<dyn NotificationRepository>,
    live_events: Arc<dyn LiveEventRepository>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
}

impl LiveNotifier {
    pub fn new(
        cache: Arc<dyn LiveStatusCache>,
        channels: Arc<dyn TrackedChannelRepository>,
        notifications: Arc<dyn NotificationRepository>,
        live_events: Arc<dyn LiveEventRepository>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { cache, channels, notifications, live_events, sink, clock }
    }

    /// Cache refresh, push to every tracker, one Notification row per tracker,
    /// then the conflict-ignoring LiveEvent insert.
    ///
    /// The steps are not transactional. Notifications are not deduplicated
    /// against an existing LiveEvent, so a repeated sighting of the same video
    /// notifies again while the LiveEvent row stays single.
    pub async fn mark_live(&self, sighting: &LiveSighting) -> Result<MarkLiveReport, Error> {
        let now = self.clock.now();

        let snapshot = CachedLiveStatus {
            video_id: sighting.video_id.clone(),
            title: sighting.title.clone(),
            is_live: true,
            checked_at: now,
        };
        if let Err(e) = self
            .cache
            .set_live_status(&sighting.channel_id, &snapshot, LIVE_STATUS_TTL)
            .await
        {
            warn!("Could not cache live status for {}: {}", sighting.channel_id, e);
        }

        let trackers = self.channels.list_trackers(&sighting.channel_id).await?;

        let event = ClientEvent::ChannelLive {
            channel_id: sighting.channel_id.clone(),
            video_id: sighting.video_id.clone(),
            title: sighting.title.clone(),
            started_at: sighting.started_at,
        };
        let mut delivered = 0;
        for tracker in &trackers {
            delivered += self.sink.notify_user(tracker.user_id, &event).await;
        }

        let rows: Vec<Notification> = trackers
            .iter()
            .map(|t| Notification {
                notification_id: Uuid::new_v4(),
                user_id: t.user_id,
                channel_id: sighting.channel_id.clone(),
                video_id: sighting.video_id.clone(),
                message: live_message(&t.channel_title, &sighting.title),
                read: false,
                created_at: now,
            })
            .collect();
        self.notifications.insert_notifications(&rows).await?;

        let new_live_event = self
            .live_events
            .insert_live_event(&LiveEvent {
                channel_id: sighting.channel_id.clone(),
                video_id: sighting.video_id.clone(),
                title: sighting.title.clone(),
                started_at: sighting.started_at,
                ended_at: None,
                checked_at: now,
                is_active: true,
            })
            .await?;

        info!(
            "Channel {} live with {} ({} trackers, {} pushed, new event: {})",
            sighting.channel_id,
            sighting.video_id,
            trackers.len(),
            delivered,
            new_live_event
        );

        Ok(MarkLiveReport {
            trackers: trackers.len(),
            delivered,
            new_live_event,
        })
    }

    /// Stamps `last_checked_at` on every tracker row of the channel. A failed
    /// write is only logged.
    pub async fn mark_checked(&self, channel_id: &str) {
        if let Err(e) = self
            .channels
            .touch_last_checked(channel_id, self.clock.now())
            .await
        {
            warn!("Could not stamp last check for {}: {}", channel_id, e);
        }
    }
}

fn live_message(channel_title: &str, video_title: &str) -> String {
    if channel_title.is_empty() {
        format!("Live now: {video_title}")
    } else {
        format!("{channel_title} is live: {video_title}")
    }
}
