//! Ledger of YouTube Data API spend against the daily budget.
//!
//! The budget is advisory: `has_budget` only answers the question, callers
//! log a warning and go ahead anyway.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::QuotaConfig;
use crate::Error;
use ytlive_common::models::{QuotaEndpoint, QuotaSummary, QuotaUsageRecord};
use ytlive_common::traits::api::Clock;
use ytlive_common::traits::repository_traits::QuotaUsageRepository;

pub struct QuotaTracker {
    repo: Arc<dyn QuotaUsageRepository>,
    clock: Arc<dyn Clock>,
    config: QuotaConfig,
}

impl QuotaTracker {
    pub fn new(repo: Arc<dyn QuotaUsageRepository>, clock: Arc<dyn Clock>, config: QuotaConfig) -> Self {
        Self { repo, clock, config }
    }

    /// Appends one ledger row. Called right after the metered request.
    pub async fn record_usage(&self, endpoint: QuotaEndpoint, user_id: Option<Uuid>) -> Result<(), Error> {
        let now = self.clock.now();
        let record = QuotaUsageRecord {
            endpoint: endpoint.as_str().to_string(),
            cost: endpoint.cost(),
            user_id,
            timestamp: now,
            date: now.date_naive(),
        };
        self.repo.record_usage(&record).await?;
        debug!("quota: recorded {} (cost {})", record.endpoint, record.cost);
        Ok(())
    }

    /// Whether today's spend plus `cost` stays within the daily limit.
    pub async fn has_budget(&self, cost: i64) -> Result<bool, Error> {
        let summary = self.usage_today().await?;
        Ok(summary.used + cost <= summary.limit)
    }

    pub async fn usage_today(&self) -> Result<QuotaSummary, Error> {
        let date = self.clock.now().date_naive();
        let used = self.repo.total_for_date(date).await?;
        Ok(QuotaSummary {
            date,
            used,
            limit: self.config.daily_limit,
        })
    }

    /// Pre-check before a metered call. Never blocks; a failed lookup counts
    /// as "has budget".
    pub async fn warn_if_exhausted(&self, endpoint: QuotaEndpoint) {
        match self.has_budget(endpoint.cost()).await {
            Ok(true) => {}
            Ok(false) => warn!(
                "Daily quota budget exhausted; calling {} anyway (cost {})",
                endpoint.as_str(),
                endpoint.cost()
            ),
            Err(e) => warn!("Quota lookup failed before {}: {}", endpoint.as_str(), e),
        }
    }
}
