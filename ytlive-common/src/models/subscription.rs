use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The WebSub lease we hold with the hub for one channel's video feed.
/// Shared by every user tracking the channel; at most one row per channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub channel_id: String,
    pub topic_url: String,
    pub subscribed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Subscription {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
