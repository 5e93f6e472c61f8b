//! The callback endpoint the hub talks to.
//!
//! - `GET  /websub/callback` answers the (un)subscribe verification handshake.
//! - `POST /websub/callback` receives signed Atom bodies, checks the signature,
//!   enqueues the body and ACKs right away.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::{SIGNATURE_HEADER, signature};
use crate::services::webhook_worker::{WebhookJob, WebhookQueue, dead_letter};
use ytlive_common::models::{DeadLetter, DeadLetterSource};
use ytlive_common::traits::api::Clock;
use ytlive_common::traits::repository_traits::DeadLetterRepository;

pub const CALLBACK_PATH: &str = "/websub/callback";

#[derive(Clone)]
pub struct WebhookState {
    secret: Arc<str>,
    queue: WebhookQueue,
    dead_letters: Arc<dyn DeadLetterRepository>,
    clock: Arc<dyn Clock>,
}

impl WebhookState {
    pub fn new(
        secret: &str,
        queue: WebhookQueue,
        dead_letters: Arc<dyn DeadLetterRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            secret: Arc::from(secret),
            queue,
            dead_letters,
            clock,
        }
    }
}

/// Query string of the hub's verification request.
#[derive(Debug, Deserialize)]
pub struct HubVerification {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.topic")]
    topic: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
    #[serde(rename = "hub.lease_seconds")]
    lease_seconds: Option<String>,
}

pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route(CALLBACK_PATH, get(verify_subscription).post(receive_notification))
        .with_state(state)
}

async fn verify_subscription(Query(query): Query<HubVerification>) -> Response {
    match query.mode.as_deref() {
        Some(mode @ ("subscribe" | "unsubscribe")) => match query.challenge {
            Some(challenge) => {
                info!(
                    "Hub verified {} for {} (lease {:?})",
                    mode,
                    query.topic.as_deref().unwrap_or("?"),
                    query.lease_seconds
                );
                (StatusCode::OK, challenge).into_response()
            }
            None => (StatusCode::BAD_REQUEST, "missing hub.challenge").into_response(),
        },
        other => {
            warn!("Rejecting hub verification with mode {:?}", other);
            StatusCode::FORBIDDEN.into_response()
        }
    }
}

async fn receive_notification(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    if let Some(value) = headers.get(SIGNATURE_HEADER) {
        let valid = value
            .to_str()
            .map(|header| signature::verify(&state.secret, &body, header))
            .unwrap_or(false);
        if !valid {
            warn!("Rejecting webhook with bad signature ({} bytes)", body.len());
            return StatusCode::FORBIDDEN;
        }
    }

    debug!("Webhook accepted ({} bytes)", body.len());
    let job = WebhookJob {
        body,
        received_at: state.clock.now(),
    };

    // The hub gets its 200 whatever happens to the job from here on.
    if let Err(job) = state.queue.enqueue(job) {
        error!("Webhook queue unavailable; dead-lettering body");
        let letter = DeadLetter::new(
            DeadLetterSource::WebhookIntake,
            String::from_utf8_lossy(&job.body).into_owned(),
            "webhook queue full or closed",
            state.clock.now(),
        );
        let repo = state.dead_letters.clone();
        tokio::spawn(async move {
            dead_letter(repo.as_ref(), letter).await;
        });
    }

    StatusCode::OK
}
