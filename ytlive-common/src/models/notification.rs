use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fan-out record: one per tracking user per live confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: Uuid,
    pub user_id: Uuid,
    pub channel_id: String,
    pub video_id: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
