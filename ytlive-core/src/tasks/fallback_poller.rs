// ytlive-core/src/tasks/fallback_poller.rs
//
// Safety net for channels whose push notifications went missing. Every sweep
// picks the channels nobody looked at recently and runs the expensive
// per-channel live search on them, one at a time.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::PollerConfig;
use crate::services::live_notifier::{LiveNotifier, LiveSighting};
use crate::services::quota_tracker::QuotaTracker;
use crate::utils::time::to_chrono;
use crate::Error;
use ytlive_common::models::{ChannelLiveSearch, QuotaEndpoint};
use ytlive_common::traits::api::{Clock, LiveStatusCache, VideoStatusApi};
use ytlive_common::traits::repository_traits::TrackedChannelRepository;

/// Tally of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    pub candidates: usize,
    pub skipped_fresh: usize,
    pub searched: usize,
    pub went_live: usize,
    pub failed: usize,
}

enum ChannelCheck {
    SkippedFresh,
    Offline,
    Live,
}

pub struct FallbackPoller {
    channels: Arc<dyn TrackedChannelRepository>,
    cache: Arc<dyn LiveStatusCache>,
    api: Arc<dyn VideoStatusApi>,
    notifier: Arc<LiveNotifier>,
    quota: Arc<QuotaTracker>,
    clock: Arc<dyn Clock>,
    config: PollerConfig,
}

impl FallbackPoller {
    pub fn new(
        channels: Arc<dyn TrackedChannelRepository>,
        cache: Arc<dyn LiveStatusCache>,
        api: Arc<dyn VideoStatusApi>,
        notifier: Arc<LiveNotifier>,
        quota: Arc<QuotaTracker>,
        clock: Arc<dyn Clock>,
        config: PollerConfig,
    ) -> Self {
        Self { channels, cache, api, notifier, quota, clock, config }
    }

    /// Runs a sweep every `config.interval` until `shutdown` flips to true.
    /// The first sweep happens right away.
    pub fn spawn(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.config.interval);
            info!(
                "Fallback poller started (every {:?}, batch {})",
                self.config.interval, self.config.batch_size
            );
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = self.sweep().await {
                            error!("Fallback sweep failed: {:?}", e);
                        }
                    }
                    Ok(_) = shutdown.changed() => {
                        if *shutdown.borrow() {
                            info!("Fallback poller shutting down");
                            break;
                        }
                    }
                }
            }
        })
    }

    /// One pass over the stalest tracked channels. Per-channel failures are
    /// logged and counted; only the candidate lookup itself can fail the sweep.
    pub async fn sweep(&self) -> Result<SweepReport, Error> {
        let cutoff = self.clock.now() - to_chrono(self.config.stale_after);
        let stale = self
            .channels
            .list_stale_channels(cutoff, self.config.batch_size)
            .await?;

        let mut report = SweepReport {
            candidates: stale.len(),
            ..Default::default()
        };
        if stale.is_empty() {
            debug!("Fallback sweep: nothing stale before {}", cutoff);
            return Ok(report);
        }
        info!("Fallback sweep: checking {} stale channel(s)", stale.len());

        for (i, channel_id) in stale.iter().enumerate() {
            if i > 0 && !self.config.inter_check_delay.is_zero() {
                sleep(self.config.inter_check_delay).await;
            }

            match self.check_channel(channel_id).await {
                Ok(ChannelCheck::SkippedFresh) => report.skipped_fresh += 1,
                Ok(ChannelCheck::Offline) => report.searched += 1,
                Ok(ChannelCheck::Live) => {
                    report.searched += 1;
                    report.went_live += 1;
                }
                Err(e) => {
                    error!("Fallback check failed for {}: {}", channel_id, e);
                    report.failed += 1;
                }
            }

            if let Err(e) = self
                .channels
                .touch_last_checked(channel_id, self.clock.now())
                .await
            {
                warn!("Could not stamp last check for {}: {}", channel_id, e);
            }
        }

        info!(
            "Fallback sweep done: {} searched, {} live, {} fresh, {} failed",
            report.searched, report.went_live, report.skipped_fresh, report.failed
        );
        Ok(report)
    }

    async fn check_channel(&self, channel_id: &str) -> Result<ChannelCheck, Error> {
        match self.cache.get_live_status(channel_id).await {
            Ok(Some(cached)) if cached.is_fresh(self.clock.now(), to_chrono(self.config.fresh_cache)) => {
                debug!("Skipping {}: cached status is fresh", channel_id);
                return Ok(ChannelCheck::SkippedFresh);
            }
            Ok(_) => {}
            Err(e) => warn!("Cache read failed for {}; searching anyway: {}", channel_id, e),
        }

        self.quota.warn_if_exhausted(QuotaEndpoint::SearchList).await;
        let search = self.search_with_retry(channel_id).await?;

        let (true, Some(video_id)) = (search.is_live, search.video_id) else {
            debug!("{} is not live", channel_id);
            return Ok(ChannelCheck::Offline);
        };

        let sighting = LiveSighting {
            channel_id: channel_id.to_string(),
            video_id,
            title: search.title.unwrap_or_default(),
            started_at: search.published_at.unwrap_or_else(|| self.clock.now()),
        };
        info!("Fallback poll found {} live with {}", channel_id, sighting.video_id);
        self.notifier.mark_live(&sighting).await?;
        Ok(ChannelCheck::Live)
    }

    async fn search_with_retry(&self, channel_id: &str) -> Result<ChannelLiveSearch, Error> {
        match self.api.search_channel_for_live_streams(channel_id).await {
            Ok(found) => Ok(found),
            Err(first) if !first.is_transient() => Err(first),
            Err(first) => {
                warn!(
                    "Live search for {} failed ({}); retrying in {:?}",
                    channel_id, first, self.config.retry_backoff
                );
                sleep(self.config.retry_backoff).await;
                self.api.search_channel_for_live_streams(channel_id).await
            }
        }
    }
}
