// File: ytlive-core/tests/unit/fallback_poller_tests.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use mockall::Sequence;
use uuid::Uuid;

use ytlive_common::models::{CachedLiveStatus, ChannelLiveSearch};
use ytlive_common::traits::repository_traits::TrackedChannelRepository;
use ytlive_core::config::PollerConfig;
use ytlive_core::tasks::{FallbackPoller, SweepReport};
use ytlive_core::Error;

use crate::test_utils::{CHANNEL_A, CHANNEL_B, MockVideoApi, Pipeline, t0, tracked};

fn quick_config() -> PollerConfig {
    PollerConfig {
        inter_check_delay: Duration::ZERO,
        retry_backoff: Duration::ZERO,
        ..PollerConfig::default()
    }
}

fn poller(pipeline: &Pipeline, api: MockVideoApi, config: PollerConfig) -> FallbackPoller {
    FallbackPoller::new(
        pipeline.store.clone(),
        pipeline.cache.clone(),
        Arc::new(api),
        pipeline.notifier.clone(),
        pipeline.quota.clone(),
        pipeline.clock.clone(),
        config,
    )
}

fn api_error(status: u16) -> Error {
    Error::Api {
        status,
        message: "search.list => backendError".into(),
    }
}

fn live_search(video_id: &str) -> ChannelLiveSearch {
    ChannelLiveSearch {
        is_live: true,
        video_id: Some(video_id.to_string()),
        title: Some("Found by search".to_string()),
        published_at: Some(t0() - ChronoDuration::minutes(5)),
    }
}

/// Pipeline with the clock one hour past `t0`, so never-checked rows are stale.
async fn pipeline_with(channels: &[(&str, Option<ChronoDuration>)]) -> Result<(Pipeline, Uuid), Error> {
    let pipeline = Pipeline::new(Arc::new(MockVideoApi::new()));
    let now = t0() + ChronoDuration::hours(1);
    pipeline.clock.set(now);

    let user = Uuid::new_v4();
    for (channel_id, checked_ago) in channels {
        let mut row = tracked(user, channel_id, "Tracked");
        row.last_checked_at = checked_ago.map(|ago| now - ago);
        pipeline.store.track_channel(&row).await?;
    }
    Ok((pipeline, user))
}

#[tokio::test]
async fn test_fresh_cache_entry_skips_search() -> Result<(), Error> {
    let (pipeline, _) = pipeline_with(&[(CHANNEL_A, None)]).await?;
    pipeline.cache.put(
        CHANNEL_A,
        CachedLiveStatus {
            video_id: "v1".into(),
            title: "cached".into(),
            is_live: true,
            checked_at: pipeline.now() - ChronoDuration::minutes(5),
        },
    );

    let mut api = MockVideoApi::new();
    api.expect_search_channel_for_live_streams().never();

    let report = poller(&pipeline, api, quick_config()).sweep().await?;

    assert_eq!(report.candidates, 1);
    assert_eq!(report.skipped_fresh, 1);
    assert_eq!(report.searched, 0);
    // Still counts as checked.
    let rows = pipeline.store.list_trackers(CHANNEL_A).await?;
    assert_eq!(rows[0].last_checked_at, Some(pipeline.now()));
    Ok(())
}

#[tokio::test]
async fn test_old_cache_entry_does_not_skip() -> Result<(), Error> {
    let (pipeline, _) = pipeline_with(&[(CHANNEL_A, None)]).await?;
    pipeline.cache.put(
        CHANNEL_A,
        CachedLiveStatus {
            video_id: "v1".into(),
            title: "cached".into(),
            is_live: true,
            checked_at: pipeline.now() - ChronoDuration::minutes(11),
        },
    );

    let mut api = MockVideoApi::new();
    api.expect_search_channel_for_live_streams()
        .times(1)
        .returning(|_| Ok(ChannelLiveSearch::offline()));

    let report = poller(&pipeline, api, quick_config()).sweep().await?;
    assert_eq!(report.searched, 1);
    assert_eq!(report.went_live, 0);
    Ok(())
}

#[tokio::test]
async fn test_cutoff_is_thirty_minutes() -> Result<(), Error> {
    let (pipeline, _) = pipeline_with(&[
        (CHANNEL_A, Some(ChronoDuration::minutes(31))),
        (CHANNEL_B, Some(ChronoDuration::minutes(29))),
    ])
    .await?;

    let mut api = MockVideoApi::new();
    api.expect_search_channel_for_live_streams()
        .withf(|channel_id| channel_id == CHANNEL_A)
        .times(1)
        .returning(|_| Ok(ChannelLiveSearch::offline()));

    let report = poller(&pipeline, api, quick_config()).sweep().await?;
    assert_eq!(report.candidates, 1);
    assert_eq!(report.searched, 1);
    Ok(())
}

#[tokio::test]
async fn test_recent_live_event_keeps_channel_out_of_sweep() -> Result<(), Error> {
    let (pipeline, _) = pipeline_with(&[(CHANNEL_A, None)]).await?;
    pipeline.store.live_events.lock().unwrap().insert(
        "v0".into(),
        ytlive_common::models::LiveEvent {
            channel_id: CHANNEL_A.into(),
            video_id: "v0".into(),
            title: "earlier".into(),
            started_at: t0(),
            ended_at: None,
            checked_at: pipeline.now() - ChronoDuration::minutes(10),
            is_active: true,
        },
    );

    let mut api = MockVideoApi::new();
    api.expect_search_channel_for_live_streams().never();

    let report = poller(&pipeline, api, quick_config()).sweep().await?;
    assert_eq!(report, SweepReport::default());
    Ok(())
}

#[tokio::test]
async fn test_live_search_marks_channel_live() -> Result<(), Error> {
    let (pipeline, user) = pipeline_with(&[(CHANNEL_A, None)]).await?;

    let mut api = MockVideoApi::new();
    api.expect_search_channel_for_live_streams()
        .times(1)
        .returning(|_| Ok(live_search("v7")));

    let report = poller(&pipeline, api, quick_config()).sweep().await?;
    assert_eq!(report.went_live, 1);

    assert_eq!(pipeline.sink.events_for(user).len(), 1);
    assert_eq!(pipeline.store.notifications_for(user).len(), 1);
    let events = pipeline.store.live_events.lock().unwrap().clone();
    let event = events.get("v7").expect("live event from poller");
    assert_eq!(event.title, "Found by search");
    assert_eq!(event.started_at, t0() - ChronoDuration::minutes(5));
    Ok(())
}

#[tokio::test]
async fn test_failed_search_is_retried_once() -> Result<(), Error> {
    let (pipeline, _) = pipeline_with(&[(CHANNEL_A, None)]).await?;

    let mut seq = Sequence::new();
    let mut api = MockVideoApi::new();
    api.expect_search_channel_for_live_streams()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Err(api_error(503)));
    api.expect_search_channel_for_live_streams()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(live_search("v8")));

    let report = poller(&pipeline, api, quick_config()).sweep().await?;
    assert_eq!(report.failed, 0);
    assert_eq!(report.went_live, 1);
    Ok(())
}

#[tokio::test]
async fn test_client_error_is_not_retried() -> Result<(), Error> {
    let (pipeline, _) = pipeline_with(&[(CHANNEL_A, None)]).await?;

    let mut api = MockVideoApi::new();
    api.expect_search_channel_for_live_streams()
        .times(1)
        .returning(|_| Err(api_error(403)));

    let report = poller(&pipeline, api, quick_config()).sweep().await?;
    assert_eq!(report.failed, 1);
    assert_eq!(report.went_live, 0);
    Ok(())
}

#[tokio::test]
async fn test_parse_failure_is_not_retried() -> Result<(), Error> {
    let (pipeline, _) = pipeline_with(&[(CHANNEL_A, None)]).await?;

    let mut api = MockVideoApi::new();
    api.expect_search_channel_for_live_streams()
        .times(1)
        .returning(|_| Err(Error::Platform("search.list parse error: eof".into())));

    let report = poller(&pipeline, api, quick_config()).sweep().await?;
    assert_eq!(report.failed, 1);
    Ok(())
}

#[tokio::test]
async fn test_channel_failure_does_not_abort_sweep() -> Result<(), Error> {
    let (pipeline, _) = pipeline_with(&[
        (CHANNEL_A, Some(ChronoDuration::hours(5))),
        (CHANNEL_B, Some(ChronoDuration::hours(4))),
    ])
    .await?;

    let mut api = MockVideoApi::new();
    api.expect_search_channel_for_live_streams()
        .withf(|channel_id| channel_id == CHANNEL_A)
        .times(2)
        .returning(|_| Err(api_error(500)));
    api.expect_search_channel_for_live_streams()
        .withf(|channel_id| channel_id == CHANNEL_B)
        .times(1)
        .returning(|_| Ok(ChannelLiveSearch::offline()));

    let report = poller(&pipeline, api, quick_config()).sweep().await?;
    assert_eq!(report.candidates, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.searched, 1);

    // The failed channel is stamped too, so it waits for the next window.
    let rows = pipeline.store.list_trackers(CHANNEL_A).await?;
    assert_eq!(rows[0].last_checked_at, Some(pipeline.now()));
    Ok(())
}

#[tokio::test]
async fn test_batch_size_caps_sweep_oldest_first() -> Result<(), Error> {
    let (pipeline, _) = pipeline_with(&[
        (CHANNEL_A, Some(ChronoDuration::hours(1))),
        (CHANNEL_B, Some(ChronoDuration::hours(3))),
    ])
    .await?;

    let mut api = MockVideoApi::new();
    api.expect_search_channel_for_live_streams()
        .withf(|channel_id| channel_id == CHANNEL_B)
        .times(1)
        .returning(|_| Ok(ChannelLiveSearch::offline()));

    let config = PollerConfig {
        batch_size: 1,
        ..quick_config()
    };
    let report = poller(&pipeline, api, config).sweep().await?;
    assert_eq!(report.candidates, 1);
    Ok(())
}
