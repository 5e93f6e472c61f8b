use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a user's client learns about live channels. Picked once when the
/// session starts.
///
/// - `ApiKey`: the client polls the YouTube Data API with its own key; the
///   backend only stores what it tracks.
/// - `Rss`: the backend holds WebSub leases and pushes `channel:live` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SessionMode {
    ApiKey { user_id: Uuid, api_key: String },
    Rss { user_id: Uuid },
}

impl SessionMode {
    pub fn user_id(&self) -> Uuid {
        match self {
            SessionMode::ApiKey { user_id, .. } => *user_id,
            SessionMode::Rss { user_id } => *user_id,
        }
    }

    pub fn uses_push(&self) -> bool {
        matches!(self, SessionMode::Rss { .. })
    }
}
