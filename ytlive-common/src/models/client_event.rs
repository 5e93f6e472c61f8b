use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events pushed to connected clients through their per-user room.
///
/// Serialized as `{"event": "channel:live", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ClientEvent {
    #[serde(rename = "channel:live", rename_all = "camelCase")]
    ChannelLive {
        channel_id: String,
        video_id: String,
        title: String,
        started_at: DateTime<Utc>,
    },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::ChannelLive { .. } => "channel:live",
        }
    }
}
