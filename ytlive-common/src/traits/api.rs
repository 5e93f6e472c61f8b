//! Seams to the collaborators the live pipeline talks to: the YouTube Data
//! API, the live-status cache and the per-user push channel.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Error;
use crate::models::{CachedLiveStatus, ChannelLiveSearch, ClientEvent, VideoLiveStatus};

#[async_trait]
pub trait VideoStatusApi: Send + Sync {
    /// Cheap by-id lookup (`videos.list`).
    async fn check_if_video_is_live(&self, video_id: &str) -> Result<VideoLiveStatus, Error>;

    /// Expensive per-channel search (`search.list`, eventType=live).
    async fn search_channel_for_live_streams(&self, channel_id: &str) -> Result<ChannelLiveSearch, Error>;
}

#[async_trait]
pub trait LiveStatusCache: Send + Sync {
    async fn get_live_status(&self, channel_id: &str) -> Result<Option<CachedLiveStatus>, Error>;
    async fn set_live_status(
        &self,
        channel_id: &str,
        status: &CachedLiveStatus,
        ttl: Duration,
    ) -> Result<(), Error>;
}

/// Per-user addressable push channel.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Returns how many live connections received the event.
    async fn notify_user(&self, user_id: Uuid, event: &ClientEvent) -> usize;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
