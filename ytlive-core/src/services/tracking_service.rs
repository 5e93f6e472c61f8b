//! Track / untrack a channel for a user, keeping the shared WebSub lease in
//! step with how many users still track the channel.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::websub::hub::SubscriptionManager;
use crate::Error;
use ytlive_common::models::{SessionMode, TrackedChannel, is_valid_channel_id};
use ytlive_common::traits::api::Clock;
use ytlive_common::traits::repository_traits::{SubscriptionRepository, TrackedChannelRepository};

#[derive(Debug, Clone, Deserialize)]
pub struct TrackRequest {
    pub channel_id: String,
    pub channel_title: String,
    pub thumbnail_url: Option<String>,
}

/// `subscription_error` carries a failed hub call; the tracking row is kept
/// regardless.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackOutcome {
    pub channel: TrackedChannel,
    pub newly_tracked: bool,
    pub subscribed: bool,
    pub subscription_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UntrackOutcome {
    pub removed: bool,
    pub remaining_trackers: i64,
    pub unsubscribed: bool,
    pub subscription_error: Option<String>,
}

pub struct TrackingService {
    channels: Arc<dyn TrackedChannelRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    manager: Arc<SubscriptionManager>,
    clock: Arc<dyn Clock>,
}

impl TrackingService {
    pub fn new(
        channels: Arc<dyn TrackedChannelRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        manager: Arc<SubscriptionManager>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { channels, subscriptions, manager, clock }
    }

    pub async fn track(&self, session: &SessionMode, request: TrackRequest) -> Result<TrackOutcome, Error> {
        if !is_valid_channel_id(&request.channel_id) {
            return Err(Error::InvalidChannelId(request.channel_id));
        }

        let channel = TrackedChannel {
            user_id: session.user_id(),
            channel_id: request.channel_id,
            channel_title: request.channel_title,
            thumbnail_url: request.thumbnail_url,
            added_at: self.clock.now(),
            last_checked_at: None,
        };
        let newly_tracked = self.channels.track_channel(&channel).await?;

        let mut outcome = TrackOutcome {
            channel,
            newly_tracked,
            subscribed: false,
            subscription_error: None,
        };

        // API-key clients poll for themselves; only push sessions need a lease.
        if !session.uses_push() {
            return Ok(outcome);
        }

        let now = self.clock.now();
        let needs_lease = match self.subscriptions.get_subscription(&outcome.channel.channel_id).await? {
            Some(existing) => existing.is_expired_at(now),
            None => true,
        };
        if !needs_lease {
            return Ok(outcome);
        }

        match self.manager.subscribe(&outcome.channel.channel_id).await {
            Ok(_) => outcome.subscribed = true,
            Err(e) => {
                warn!(
                    "Tracking {} kept but hub subscription failed: {}",
                    outcome.channel.channel_id, e
                );
                outcome.subscription_error = Some(e.to_string());
            }
        }
        Ok(outcome)
    }

    pub async fn untrack(&self, session: &SessionMode, channel_id: &str) -> Result<UntrackOutcome, Error> {
        let removed = self
            .channels
            .untrack_channel(session.user_id(), channel_id)
            .await?;
        let remaining_trackers = self.channels.count_trackers(channel_id).await?;

        let mut outcome = UntrackOutcome {
            removed,
            remaining_trackers,
            unsubscribed: false,
            subscription_error: None,
        };

        // Count-then-unsubscribe is not atomic: a concurrent track between the
        // two steps can leave a tracked channel without a lease until the next
        // track call or poller sweep picks it up.
        if remaining_trackers > 0
            || self.subscriptions.get_subscription(channel_id).await?.is_none()
        {
            return Ok(outcome);
        }

        match self.manager.unsubscribe(channel_id).await {
            Ok(()) => {
                info!("Last tracker left {}; lease cancelled", channel_id);
                outcome.unsubscribed = true;
            }
            Err(e) => {
                warn!("Untracked {} but hub unsubscribe failed: {}", channel_id, e);
                outcome.subscription_error = Some(e.to_string());
            }
        }
        Ok(outcome)
    }

    pub async fn list_tracked(&self, session: &SessionMode) -> Result<Vec<TrackedChannel>, Error> {
        self.channels.list_for_user(session.user_id()).await
    }
}
