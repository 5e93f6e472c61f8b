// File: ytlive-core/tests/unit/quota_tests.rs

use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use uuid::Uuid;

use ytlive_common::models::QuotaEndpoint;
use ytlive_core::config::QuotaConfig;
use ytlive_core::services::ReconcileOutcome;
use ytlive_core::Error;

use crate::test_utils::{CHANNEL_A, MockVideoApi, Pipeline, live_status, t0};

fn pipeline_with_limit(daily_limit: i64, api: MockVideoApi) -> Pipeline {
    Pipeline::with_quota(Arc::new(api), QuotaConfig { daily_limit })
}

#[tokio::test]
async fn test_usage_sums_costs_for_today() -> Result<(), Error> {
    let pipeline = pipeline_with_limit(10_000, MockVideoApi::new());
    let user = Uuid::new_v4();

    pipeline.quota.record_usage(QuotaEndpoint::VideosList, None).await?;
    pipeline.quota.record_usage(QuotaEndpoint::SearchList, Some(user)).await?;
    pipeline.quota.record_usage(QuotaEndpoint::VideosList, None).await?;

    let summary = pipeline.quota.usage_today().await?;
    assert_eq!(summary.date, t0().date_naive());
    assert_eq!(summary.used, 102);
    assert_eq!(summary.limit, 10_000);
    assert_eq!(summary.remaining(), 9_898);

    let rows = pipeline.store.quota.lock().unwrap().clone();
    assert_eq!(rows[1].endpoint, "search.list");
    assert_eq!(rows[1].user_id, Some(user));
    Ok(())
}

#[tokio::test]
async fn test_usage_resets_on_next_utc_day() -> Result<(), Error> {
    let pipeline = pipeline_with_limit(10_000, MockVideoApi::new());
    pipeline.quota.record_usage(QuotaEndpoint::SearchList, None).await?;

    pipeline.clock.advance(ChronoDuration::days(1));
    assert_eq!(pipeline.quota.usage_today().await?.used, 0);
    Ok(())
}

#[tokio::test]
async fn test_has_budget_compares_against_limit() -> Result<(), Error> {
    let pipeline = pipeline_with_limit(150, MockVideoApi::new());
    pipeline.quota.record_usage(QuotaEndpoint::SearchList, None).await?;

    assert!(pipeline.quota.has_budget(QuotaEndpoint::VideosList.cost()).await?);
    assert!(pipeline.quota.has_budget(50).await?);
    assert!(!pipeline.quota.has_budget(QuotaEndpoint::SearchList.cost()).await?);
    Ok(())
}

#[tokio::test]
async fn test_exhausted_budget_does_not_block_calls() -> Result<(), Error> {
    let mut api = MockVideoApi::new();
    api.expect_check_if_video_is_live()
        .times(1)
        .returning(|_| Ok(live_status("Still going")));
    let pipeline = pipeline_with_limit(0, api);

    assert!(!pipeline.quota.has_budget(1).await?);
    let outcome = pipeline.reconciler.reconcile("v1", CHANNEL_A, "x").await?;
    assert!(matches!(outcome, ReconcileOutcome::Live(_)));
    Ok(())
}

#[test]
fn test_remaining_never_goes_negative() {
    let summary = ytlive_common::models::QuotaSummary {
        date: t0().date_naive(),
        used: 12_000,
        limit: 10_000,
    };
    assert_eq!(summary.remaining(), 0);
}
