//! HTTP client abstraction for outbound calls (WebSub hub, YouTube Data API).
//!
//! The trait keeps the hub and API clients testable without network access:
//! production code holds a [`DefaultHttpClient`], tests hand in a mock.
//!
//! # Example Usage:
//! ``
//! use crate::http::{HttpClient, DefaultHttpClient};
//!
//! let client: Arc<dyn HttpClient> = Arc::new(DefaultHttpClient::with_timeout(Duration::from_secs(10))?);
//! let resp = client.get(url, vec![("id".into(), video_id.into())]).await?;
//! ``

use std::time::Duration;

use async_trait::async_trait;
use reqwest;

use crate::Error;

/// Status and body of a finished request. Non-2xx statuses are returned, not
/// turned into errors; callers decide what a failure means for them.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POST an `application/x-www-form-urlencoded` body.
    async fn post_form(&self, url: String, form: Vec<(String, String)>) -> Result<HttpResponse, Error>;
    /// GET with query parameters appended to `url`.
    async fn get(&self, url: String, query: Vec<(String, String)>) -> Result<HttpResponse, Error>;
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct DefaultHttpClient {
    client: reqwest::Client,
}

impl DefaultHttpClient {
    pub fn new() -> Result<Self, Error> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Every request made through this client is bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for DefaultHttpClient {
    async fn post_form(&self, url: String, form: Vec<(String, String)>) -> Result<HttpResponse, Error> {
        let response = self.client
            .post(&url)
            .form(&form)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }

    async fn get(&self, url: String, query: Vec<(String, String)>) -> Result<HttpResponse, Error> {
        let response = self.client
            .get(&url)
            .query(&query)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
