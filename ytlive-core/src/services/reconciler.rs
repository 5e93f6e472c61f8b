//! Confirms a pushed video is actually live before anyone is notified.

use std::sync::Arc;

use tracing::{debug, info};

use super::live_notifier::{LiveNotifier, LiveSighting, MarkLiveReport};
use super::quota_tracker::QuotaTracker;
use crate::Error;
use ytlive_common::models::QuotaEndpoint;
use ytlive_common::traits::api::{Clock, VideoStatusApi};

#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    Live(MarkLiveReport),
    /// Not live (uploads, premieres that have not started, ended streams).
    /// Only the channel's last-check stamp is written.
    NotLive,
}

pub struct LiveReconciler {
    api: Arc<dyn VideoStatusApi>,
    quota: Arc<QuotaTracker>,
    notifier: Arc<LiveNotifier>,
    clock: Arc<dyn Clock>,
}

impl LiveReconciler {
    pub fn new(
        api: Arc<dyn VideoStatusApi>,
        quota: Arc<QuotaTracker>,
        notifier: Arc<LiveNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { api, quota, notifier, clock }
    }

    /// Single attempt, no retry: the webhook path must not pile up calls.
    pub async fn reconcile(&self, video_id: &str, channel_id: &str, title: &str) -> Result<ReconcileOutcome, Error> {
        self.quota.warn_if_exhausted(QuotaEndpoint::VideosList).await;

        let status = self.api.check_if_video_is_live(video_id).await?;
        self.notifier.mark_checked(channel_id).await;

        if !status.is_live {
            debug!("{} on {} is not live", video_id, channel_id);
            return Ok(ReconcileOutcome::NotLive);
        }

        let sighting = LiveSighting {
            channel_id: channel_id.to_string(),
            video_id: video_id.to_string(),
            title: status
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| title.to_string()),
            started_at: status.started_at.unwrap_or_else(|| self.clock.now()),
        };
        info!("Webhook confirmed {} live on {}", video_id, channel_id);
        let report = self.notifier.mark_live(&sighting).await?;
        Ok(ReconcileOutcome::Live(report))
    }
}
