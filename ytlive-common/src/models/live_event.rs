use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed live session, keyed by `video_id`.
///
/// `ended_at` stays `None` and `is_active` stays `true`: nothing in the
/// pipeline detects the end of a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveEvent {
    pub channel_id: String,
    pub video_id: String,
    pub title: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub checked_at: DateTime<Utc>,
    pub is_active: bool,
}
