pub mod quota_tracker;
pub mod live_notifier;
pub mod reconciler;
pub mod tracking_service;
pub mod webhook_worker;

pub use quota_tracker::QuotaTracker;
pub use live_notifier::{LiveNotifier, LiveSighting, MarkLiveReport};
pub use reconciler::{LiveReconciler, ReconcileOutcome};
pub use tracking_service::{TrackingService, TrackOutcome, UntrackOutcome, TrackRequest};
pub use webhook_worker::{WebhookJob, WebhookQueue, WebhookWorker, webhook_queue};
