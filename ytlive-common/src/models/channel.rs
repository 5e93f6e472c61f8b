use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row in `tracked_channels`. Unique per (user_id, channel_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedChannel {
    pub user_id: Uuid,
    pub channel_id: String,
    pub channel_title: String,
    pub thumbnail_url: Option<String>,
    pub added_at: DateTime<Utc>,
    pub last_checked_at: Option<DateTime<Utc>>,
}

/// YouTube channel ids are 24 characters: the `UC` prefix followed by
/// 22 url-safe base64 characters.
pub fn is_valid_channel_id(channel_id: &str) -> bool {
    channel_id.len() == 24
        && channel_id.starts_with("UC")
        && channel_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
