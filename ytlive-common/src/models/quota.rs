use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metered YouTube Data API endpoints and their unit cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuotaEndpoint {
    VideosList,
    SearchList,
}

impl QuotaEndpoint {
    pub fn cost(&self) -> i64 {
        match self {
            QuotaEndpoint::VideosList => 1,
            QuotaEndpoint::SearchList => 100,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaEndpoint::VideosList => "videos.list",
            QuotaEndpoint::SearchList => "search.list",
        }
    }
}

/// Append-only ledger row in `quota_usage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaUsageRecord {
    pub endpoint: String,
    pub cost: i64,
    pub user_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuotaSummary {
    pub date: NaiveDate,
    pub used: i64,
    pub limit: i64,
}

impl QuotaSummary {
    pub fn remaining(&self) -> i64 {
        (self.limit - self.used).max(0)
    }
}
