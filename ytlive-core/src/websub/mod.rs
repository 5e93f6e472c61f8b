//! WebSub (PubSubHubbub) plumbing: lease management with the hub, the
//! callback endpoint the hub talks to, body signatures and Atom parsing.

pub mod feed;
pub mod hub;
pub mod signature;
pub mod webhook;

pub use hub::{SubscriptionManager, topic_url};
pub use webhook::{WebhookState, router};

/// Header carrying `sha1=<hex>` over the raw POST body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";
