use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::requests::{SearchResponse, VideosResponse};
use super::YOUTUBE_API_BASE;
use crate::http::{HttpClient, HttpResponse};
use crate::services::quota_tracker::QuotaTracker;
use crate::Error;
use ytlive_common::models::{ChannelLiveSearch, QuotaEndpoint, VideoLiveStatus};
use ytlive_common::traits::api::VideoStatusApi;

/// Server-side YouTube Data API client. Every call that reaches the API is
/// recorded in the quota ledger.
pub struct YouTubeDataClient {
    http: Arc<dyn HttpClient>,
    quota: Arc<QuotaTracker>,
    api_key: String,
    base_url: String,
}

impl YouTubeDataClient {
    pub fn new(http: Arc<dyn HttpClient>, quota: Arc<QuotaTracker>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            quota,
            api_key: api_key.into(),
            base_url: YOUTUBE_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn metered_get(
        &self,
        endpoint: QuotaEndpoint,
        path: &str,
        mut query: Vec<(String, String)>,
    ) -> Result<HttpResponse, Error> {
        query.push(("key".to_string(), self.api_key.clone()));
        let url = format!("{}/{}", self.base_url, path);
        let resp = self.http.get(url, query).await?;

        // Quota is charged for every request the API answered, errors included.
        if let Err(e) = self.quota.record_usage(endpoint, None).await {
            warn!("Failed to record quota usage for {}: {}", endpoint.as_str(), e);
        }

        if !resp.is_success() {
            return Err(Error::Api {
                status: resp.status,
                message: format!("{} => {}", endpoint.as_str(), resp.body),
            });
        }
        Ok(resp)
    }
}

#[async_trait]
impl VideoStatusApi for YouTubeDataClient {
    async fn check_if_video_is_live(&self, video_id: &str) -> Result<VideoLiveStatus, Error> {
        let resp = self
            .metered_get(
                QuotaEndpoint::VideosList,
                "videos",
                vec![
                    ("part".into(), "snippet,liveStreamingDetails".into()),
                    ("id".into(), video_id.to_string()),
                ],
            )
            .await?;

        let parsed: VideosResponse = serde_json::from_str(&resp.body)
            .map_err(|e| Error::Platform(format!("videos.list parse error: {}", e)))?;

        let Some(item) = parsed.items.into_iter().next() else {
            debug!("videos.list returned no item for {}", video_id);
            return Ok(VideoLiveStatus {
                is_live: false,
                title: None,
                viewer_count: None,
                started_at: None,
            });
        };

        let broadcasting = item
            .snippet
            .as_ref()
            .map(|s| s.live_broadcast_content == "live")
            .unwrap_or(false);
        let details = item.live_streaming_details.as_ref();
        let ended = details.and_then(|d| d.actual_end_time).is_some();

        Ok(VideoLiveStatus {
            is_live: broadcasting && !ended,
            title: item.snippet.map(|s| s.title),
            viewer_count: details
                .and_then(|d| d.concurrent_viewers.as_deref())
                .and_then(|v| v.parse().ok()),
            started_at: details.and_then(|d| d.actual_start_time),
        })
    }

    async fn search_channel_for_live_streams(&self, channel_id: &str) -> Result<ChannelLiveSearch, Error> {
        let resp = self
            .metered_get(
                QuotaEndpoint::SearchList,
                "search",
                vec![
                    ("part".into(), "snippet".into()),
                    ("channelId".into(), channel_id.to_string()),
                    ("eventType".into(), "live".into()),
                    ("type".into(), "video".into()),
                    ("maxResults".into(), "1".into()),
                ],
            )
            .await?;

        let parsed: SearchResponse = serde_json::from_str(&resp.body)
            .map_err(|e| Error::Platform(format!("search.list parse error: {}", e)))?;

        let hit = parsed
            .items
            .into_iter()
            .find(|item| item.id.video_id.is_some());

        Ok(match hit {
            Some(item) => ChannelLiveSearch {
                is_live: true,
                video_id: item.id.video_id,
                title: item.snippet.as_ref().map(|s| s.title.clone()),
                published_at: item.snippet.and_then(|s| s.published_at),
            },
            None => ChannelLiveSearch::offline(),
        })
    }
}
