//! Background processing of pushed feeds.
//!
//! The callback handler only verifies and enqueues; this worker parses and
//! reconciles after the hub already got its 200. Anything that fails past
//! that point lands in the dead-letter log.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::reconciler::LiveReconciler;
use crate::websub::feed::parse_feed;
use ytlive_common::models::{DeadLetter, DeadLetterSource};
use ytlive_common::traits::api::Clock;
use ytlive_common::traits::repository_traits::DeadLetterRepository;

#[derive(Debug, Clone)]
pub struct WebhookJob {
    pub body: Bytes,
    pub received_at: DateTime<Utc>,
}

/// Sending half handed to the HTTP layer.
#[derive(Clone)]
pub struct WebhookQueue {
    tx: mpsc::Sender<WebhookJob>,
}

impl WebhookQueue {
    /// Never waits. Gives the job back when the queue is full or the worker
    /// is gone.
    pub fn enqueue(&self, job: WebhookJob) -> Result<(), WebhookJob> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(job) => job,
            mpsc::error::TrySendError::Closed(job) => job,
        })
    }
}

pub fn webhook_queue(capacity: usize) -> (WebhookQueue, mpsc::Receiver<WebhookJob>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (WebhookQueue { tx }, rx)
}

pub struct WebhookWorker {
    rx: mpsc::Receiver<WebhookJob>,
    reconciler: Arc<LiveReconciler>,
    dead_letters: Arc<dyn DeadLetterRepository>,
    clock: Arc<dyn Clock>,
}

impl WebhookWorker {
    pub fn new(
        rx: mpsc::Receiver<WebhookJob>,
        reconciler: Arc<LiveReconciler>,
        dead_letters: Arc<dyn DeadLetterRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { rx, reconciler, dead_letters, clock }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs until every queue handle has been dropped.
    pub async fn run(mut self) {
        info!("Webhook worker started");
        while let Some(job) = self.rx.recv().await {
            process_job(&self.reconciler, self.dead_letters.as_ref(), self.clock.as_ref(), job).await;
        }
        info!("Webhook worker stopped");
    }
}

/// Parses one pushed body and reconciles each entry in order. Failures are
/// logged and dead-lettered, never returned.
pub async fn process_job(
    reconciler: &LiveReconciler,
    dead_letters: &dyn DeadLetterRepository,
    clock: &dyn Clock,
    job: WebhookJob,
) {
    let body = String::from_utf8_lossy(&job.body).into_owned();

    let entries = match parse_feed(&body) {
        Ok(entries) => entries,
        Err(e) => {
            error!("Dropping unparseable webhook body: {}", e);
            dead_letter(dead_letters, DeadLetter::new(DeadLetterSource::WebhookIntake, body, e, clock.now())).await;
            return;
        }
    };

    if entries.is_empty() {
        debug!("Webhook body carried no video entries");
        return;
    }

    for entry in entries {
        if let Err(e) = reconciler
            .reconcile(&entry.video_id, &entry.channel_id, &entry.title)
            .await
        {
            error!(
                "Reconcile failed for video {} on {}: {}",
                entry.video_id, entry.channel_id, e
            );
            let payload = serde_json::json!({
                "video_id": entry.video_id,
                "channel_id": entry.channel_id,
                "title": entry.title,
            })
            .to_string();
            dead_letter(dead_letters, DeadLetter::new(DeadLetterSource::Reconcile, payload, e, clock.now())).await;
        }
    }
}

pub async fn dead_letter(repo: &dyn DeadLetterRepository, letter: DeadLetter) {
    if let Err(e) = repo.record_dead_letter(&letter).await {
        error!(
            "Failed to write dead letter ({}): {} | original error: {}",
            letter.source.as_str(),
            e,
            letter.error
        );
    }
}
