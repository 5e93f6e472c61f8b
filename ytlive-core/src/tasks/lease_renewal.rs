use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::LeaseRenewalConfig;
use crate::utils::time::to_chrono;
use crate::websub::hub::SubscriptionManager;
use crate::Error;
use ytlive_common::traits::api::Clock;
use ytlive_common::traits::repository_traits::{SubscriptionRepository, TrackedChannelRepository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenewalReport {
    pub renewed: usize,
    pub dropped: usize,
    pub failed: usize,
}

/// Re-subscribes every lease expiring within `renew_ahead`. Leases of channels
/// nobody tracks anymore are removed instead.
///
/// Returns Ok even if some renewals fail (logs errors).
pub async fn renew_expiring_leases(
    subscriptions: &dyn SubscriptionRepository,
    channels: &dyn TrackedChannelRepository,
    manager: &SubscriptionManager,
    clock: &dyn Clock,
    renew_ahead: std::time::Duration,
) -> Result<RenewalReport, Error> {
    let horizon = clock.now() + to_chrono(renew_ahead);
    let expiring = subscriptions.list_expiring(horizon).await?;

    let mut report = RenewalReport::default();
    if expiring.is_empty() {
        info!("No WebSub leases expiring before {}", horizon);
        return Ok(report);
    }
    info!("Found {} lease(s) expiring soon; renewing...", expiring.len());

    for sub in expiring {
        let channel_id = sub.channel_id;

        match channels.count_trackers(&channel_id).await {
            Ok(0) => {
                match subscriptions.delete_subscription(&channel_id).await {
                    Ok(()) => {
                        info!("Dropped lease for untracked channel {}", channel_id);
                        report.dropped += 1;
                    }
                    Err(e) => {
                        error!("Failed to drop lease for {}: {:?}", channel_id, e);
                        report.failed += 1;
                    }
                }
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                error!("Could not count trackers of {}; skipping lease: {:?}", channel_id, e);
                report.failed += 1;
                continue;
            }
        }

        match manager.subscribe(&channel_id).await {
            Ok(renewed) => {
                info!("Renewed lease for {} until {}", channel_id, renewed.expires_at);
                report.renewed += 1;
            }
            Err(e) => {
                error!("Failed to renew lease for {}: {:?}", channel_id, e);
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

pub fn spawn_lease_renewal_task(
    subscriptions: Arc<dyn SubscriptionRepository>,
    channels: Arc<dyn TrackedChannelRepository>,
    manager: Arc<SubscriptionManager>,
    clock: Arc<dyn Clock>,
    config: LeaseRenewalConfig,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = renew_expiring_leases(
                        subscriptions.as_ref(),
                        channels.as_ref(),
                        &manager,
                        clock.as_ref(),
                        config.renew_ahead,
                    ).await {
                        error!("Lease renewal pass failed: {:?}", e);
                    }
                }
                Ok(_) = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Lease renewal task shutting down");
                        break;
                    }
                }
            }
        }
    })
}
