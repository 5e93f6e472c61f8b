// File: ytlive-common/src/models/mod.rs
pub mod channel;
pub mod subscription;
pub mod live_event;
pub mod notification;
pub mod quota;
pub mod live_status;
pub mod feed;
pub mod client_event;
pub mod session;
pub mod dead_letter;

pub use channel::{TrackedChannel, is_valid_channel_id};
pub use subscription::Subscription;
pub use live_event::LiveEvent;
pub use notification::Notification;
pub use quota::{QuotaEndpoint, QuotaUsageRecord, QuotaSummary};
pub use live_status::{CachedLiveStatus, ChannelLiveSearch, VideoLiveStatus};
pub use feed::FeedEntry;
pub use client_event::ClientEvent;
pub use session::SessionMode;
pub use dead_letter::{DeadLetter, DeadLetterSource};
