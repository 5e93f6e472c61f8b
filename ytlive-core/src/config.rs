// ytlive-core/src/config.rs

use std::time::Duration;

/// Hub the YouTube feeds publish through.
pub const DEFAULT_HUB_URL: &str = "https://pubsubhubbub.appspot.com/subscribe";

/// Ten days, the longest lease the hub grants.
pub const DEFAULT_LEASE_SECONDS: u64 = 864_000;

pub const DEFAULT_DAILY_QUOTA: i64 = 10_000;

#[derive(Debug, Clone)]
pub struct WebSubConfig {
    pub hub_url: String,
    /// Public URL the hub calls back (GET verification, POST notifications).
    pub callback_url: String,
    /// Shared secret the hub signs pushed bodies with.
    pub secret: String,
    pub lease: Duration,
}

impl Default for WebSubConfig {
    fn default() -> Self {
        Self {
            hub_url: DEFAULT_HUB_URL.to_string(),
            callback_url: "http://localhost:8080/websub/callback".to_string(),
            secret: String::new(),
            lease: Duration::from_secs(DEFAULT_LEASE_SECONDS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    /// Channels with no check newer than this are picked up by a sweep.
    pub stale_after: Duration,
    /// Cached live entries younger than this skip the search call.
    pub fresh_cache: Duration,
    /// Upper bound of channels per sweep.
    pub batch_size: i64,
    /// Pause between two channel checks within one sweep.
    pub inter_check_delay: Duration,
    /// Wait before the single retry of a failed search.
    pub retry_backoff: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(15 * 60),
            stale_after: Duration::from_secs(30 * 60),
            fresh_cache: Duration::from_secs(10 * 60),
            batch_size: 10,
            inter_check_delay: Duration::from_secs(2),
            retry_backoff: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QuotaConfig {
    pub daily_limit: i64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self { daily_limit: DEFAULT_DAILY_QUOTA }
    }
}

#[derive(Debug, Clone)]
pub struct LeaseRenewalConfig {
    pub interval: Duration,
    /// Leases expiring within this window get renewed.
    pub renew_ahead: Duration,
}

impl Default for LeaseRenewalConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3600),
            renew_ahead: Duration::from_secs(24 * 3600),
        }
    }
}
