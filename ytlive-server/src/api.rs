//! ytlive-server/src/api.rs
//!
//! JSON endpoints the clients use: track / untrack, tracked lists,
//! notification history and the quota ledger. Operators also get a read-only
//! view of the dead-letter log.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use ytlive_common::models::{DeadLetter, Notification, QuotaSummary, SessionMode, TrackedChannel};
use ytlive_common::traits::repository_traits::{DeadLetterRepository, NotificationRepository};
use ytlive_core::Error;
use ytlive_core::services::{QuotaTracker, TrackOutcome, TrackRequest, TrackingService, UntrackOutcome};

/// Upper bound for one page of notification history.
const NOTIFICATION_PAGE: i64 = 100;

const DEFAULT_DEAD_LETTER_PAGE: i64 = 50;
const MAX_DEAD_LETTER_PAGE: i64 = 500;

#[derive(Clone)]
pub struct ApiState {
    pub tracking: Arc<TrackingService>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub quota: Arc<QuotaTracker>,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidChannelId(id) => ApiError::new(
                StatusCode::BAD_REQUEST,
                "INVALID_CHANNEL_ID",
                format!("'{}' is not a YouTube channel id", id),
            ),
            Error::NotFound(what) => ApiError::not_found(what),
            Error::Database(e) => {
                error!("Database error: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Database error occurred")
            }
            other => {
                error!("Unexpected error: {}", other);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred",
                )
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct TrackBody {
    pub session: SessionMode,
    pub channel: TrackRequest,
}

#[derive(Debug, Deserialize)]
pub struct UntrackBody {
    pub session: SessionMode,
    pub channel_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeadLetterQuery {
    pub limit: Option<i64>,
}

impl DeadLetterQuery {
    fn page_size(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_DEAD_LETTER_PAGE)
            .clamp(1, MAX_DEAD_LETTER_PAGE)
    }
}

#[derive(Debug, Serialize)]
pub struct QuotaResponse {
    #[serde(flatten)]
    pub summary: QuotaSummary,
    pub remaining: i64,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/channels/track", post(track_channel))
        .route("/api/channels/untrack", post(untrack_channel))
        .route("/api/users/{user_id}/channels", get(list_channels))
        .route("/api/users/{user_id}/notifications", get(list_notifications))
        .route("/api/users/{user_id}/notifications/{notification_id}/read", post(mark_read))
        .route("/api/quota", get(quota_today))
        .with_state(state)
}

/// Newest failed webhook deliveries first.
pub fn dead_letter_router(dead_letters: Arc<dyn DeadLetterRepository>) -> Router {
    Router::new()
        .route("/api/dead-letters", get(list_dead_letters))
        .with_state(dead_letters)
}

/// Liveness check; carries no state so it stays up while Postgres is down.
pub fn health_router() -> Router {
    Router::new().route("/health", get(|| async { "ok" }))
}

async fn track_channel(State(state): State<ApiState>, Json(body): Json<TrackBody>) -> ApiResult<Json<TrackOutcome>> {
    let outcome = state.tracking.track(&body.session, body.channel).await?;
    Ok(Json(outcome))
}

async fn untrack_channel(
    State(state): State<ApiState>,
    Json(body): Json<UntrackBody>,
) -> ApiResult<Json<UntrackOutcome>> {
    let outcome = state.tracking.untrack(&body.session, &body.channel_id).await?;
    Ok(Json(outcome))
}

async fn list_channels(
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TrackedChannel>>> {
    // Listing reads rows only, so either session mode gives the same answer.
    let session = SessionMode::Rss { user_id };
    Ok(Json(state.tracking.list_tracked(&session).await?))
}

async fn list_notifications(
    State(state): State<ApiState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<NotificationQuery>,
) -> ApiResult<Json<Vec<Notification>>> {
    let rows = state
        .notifications
        .list_for_user(user_id, query.unread_only, NOTIFICATION_PAGE)
        .await?;
    Ok(Json(rows))
}

async fn mark_read(
    State(state): State<ApiState>,
    Path((user_id, notification_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    if state.notifications.mark_read(user_id, notification_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("notification {} not found", notification_id)))
    }
}

async fn quota_today(State(state): State<ApiState>) -> ApiResult<Json<QuotaResponse>> {
    let summary = state.quota.usage_today().await?;
    Ok(Json(QuotaResponse {
        remaining: summary.remaining(),
        summary,
    }))
}

async fn list_dead_letters(
    State(dead_letters): State<Arc<dyn DeadLetterRepository>>,
    Query(query): Query<DeadLetterQuery>,
) -> ApiResult<Json<Vec<DeadLetter>>> {
    Ok(Json(dead_letters.list_recent(query.page_size()).await?))
}
