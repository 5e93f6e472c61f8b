use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a by-id video status lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoLiveStatus {
    pub is_live: bool,
    pub title: Option<String>,
    pub viewer_count: Option<u64>,
    pub started_at: Option<DateTime<Utc>>,
}

/// Result of a per-channel live search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelLiveSearch {
    pub is_live: bool,
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl ChannelLiveSearch {
    pub fn offline() -> Self {
        Self {
            is_live: false,
            video_id: None,
            title: None,
            published_at: None,
        }
    }
}

/// Value stored under `live:{channel_id}` in Redis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedLiveStatus {
    pub video_id: String,
    pub title: String,
    pub is_live: bool,
    pub checked_at: DateTime<Utc>,
}

impl CachedLiveStatus {
    pub fn cache_key(channel_id: &str) -> String {
        format!("live:{channel_id}")
    }

    pub fn is_fresh(&self, now: DateTime<Utc>, max_age: chrono::Duration) -> bool {
        now - self.checked_at < max_age
    }
}
