use std::sync::Arc;

use tracing::{error, info};

use crate::config::WebSubConfig;
use crate::http::HttpClient;
use crate::utils::time::to_chrono;
use crate::Error;
use ytlive_common::models::Subscription;
use ytlive_common::traits::api::Clock;
use ytlive_common::traits::repository_traits::SubscriptionRepository;

/// Per-channel video feed the hub publishes.
pub fn topic_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/xml/feeds/videos.xml?channel_id={channel_id}")
}

/// Holds WebSub leases with the hub, one per distinct tracked channel.
///
/// Whether a channel still has trackers is the caller's business; this type
/// only talks to the hub and keeps the `subscriptions` table in step.
pub struct SubscriptionManager {
    http: Arc<dyn HttpClient>,
    repo: Arc<dyn SubscriptionRepository>,
    clock: Arc<dyn Clock>,
    config: WebSubConfig,
}

impl SubscriptionManager {
    pub fn new(
        http: Arc<dyn HttpClient>,
        repo: Arc<dyn SubscriptionRepository>,
        clock: Arc<dyn Clock>,
        config: WebSubConfig,
    ) -> Self {
        Self { http, repo, clock, config }
    }

    /// Requests (or extends) the lease for `channel_id` and records it.
    /// Re-subscribing an already subscribed channel only moves `expires_at`.
    pub async fn subscribe(&self, channel_id: &str) -> Result<Subscription, Error> {
        let topic = topic_url(channel_id);
        self.send_hub_request("subscribe", &topic).await?;

        let now = self.clock.now();
        let subscription = Subscription {
            channel_id: channel_id.to_string(),
            topic_url: topic,
            subscribed_at: now,
            expires_at: now + to_chrono(self.config.lease),
        };
        self.repo.upsert_subscription(&subscription).await?;

        info!(
            "Subscribed to {} until {}",
            subscription.channel_id, subscription.expires_at
        );
        Ok(subscription)
    }

    /// Cancels the lease and drops the row. Only call once nobody tracks the
    /// channel any more.
    pub async fn unsubscribe(&self, channel_id: &str) -> Result<(), Error> {
        let topic = topic_url(channel_id);
        self.send_hub_request("unsubscribe", &topic).await?;
        self.repo.delete_subscription(channel_id).await?;
        info!("Unsubscribed from {}", channel_id);
        Ok(())
    }

    async fn send_hub_request(&self, mode: &str, topic: &str) -> Result<(), Error> {
        let mut form = vec![
            ("hub.callback".to_string(), self.config.callback_url.clone()),
            ("hub.topic".to_string(), topic.to_string()),
            ("hub.mode".to_string(), mode.to_string()),
            ("hub.verify".to_string(), "async".to_string()),
            ("hub.lease_seconds".to_string(), self.config.lease.as_secs().to_string()),
        ];
        if !self.config.secret.is_empty() {
            form.push(("hub.secret".to_string(), self.config.secret.clone()));
        }

        let resp = match self.http.post_form(self.config.hub_url.clone(), form).await {
            Ok(resp) => resp,
            Err(e) => {
                error!("Hub {} request for {} failed: {}", mode, topic, e);
                return Err(Error::Hub(format!("{mode} request failed: {e}")));
            }
        };

        // 202 Accepted for async verification, 204 when the hub verified inline.
        if !resp.is_success() {
            error!("Hub rejected {} for {}: HTTP {} {}", mode, topic, resp.status, resp.body);
            return Err(Error::Hub(format!(
                "{mode} rejected: HTTP {} {}",
                resp.status, resp.body
            )));
        }
        Ok(())
    }
}
