use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterSource {
    /// Body could not be queued or parsed.
    WebhookIntake,
    /// A parsed entry failed during reconciliation.
    Reconcile,
}

impl DeadLetterSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadLetterSource::WebhookIntake => "webhook_intake",
            DeadLetterSource::Reconcile => "reconcile",
        }
    }
}

/// A webhook delivery whose processing failed after the hub was already ACKed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeadLetter {
    pub dead_letter_id: Uuid,
    pub source: DeadLetterSource,
    pub payload: String,
    pub error: String,
    pub created_at: DateTime<Utc>,
}

impl DeadLetter {
    pub fn new(source: DeadLetterSource, payload: impl Into<String>, error: impl ToString, at: DateTime<Utc>) -> Self {
        Self {
            dead_letter_id: Uuid::new_v4(),
            source,
            payload: payload.into(),
            error: error.to_string(),
            created_at: at,
        }
    }
}
