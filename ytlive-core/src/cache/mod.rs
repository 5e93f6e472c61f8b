//! Short-lived live-status snapshots.
//!
//! The Redis entry `live:{channel_id}` holds the last confirmed live state of a
//! channel for a few minutes, so the poller can skip channels the push
//! pipeline already confirmed.

pub mod live_cache;

pub use live_cache::RedisLiveCache;
pub use ytlive_common::traits::api::LiveStatusCache;

use std::time::Duration;

/// TTL for `live:{channel_id}` entries.
pub const LIVE_STATUS_TTL: Duration = Duration::from_secs(300);
