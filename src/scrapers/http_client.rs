//! HTTP fetch capability with bounded timeouts.
//!
//! Every call carries its own timeout: the lightweight existence probe is
//! short (5s), full-page fetches longer (10s). A timeout is a fetch failure
//! like any other; callers treat it as "this step produced nothing".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// Desktop user agent sent on all page fetches. Some restaurant sites
/// serve an empty shell to unknown agents.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Timeout for lightweight existence probes.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for full-page fetches.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from the fetch capability.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),
}

/// Result of a HEAD-equivalent existence check.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: u16,
    pub content_type: Option<String>,
}

impl ProbeResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A fetched response body with its content type.
#[derive(Debug, Clone)]
pub struct FetchedBody {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Bounded-timeout HTTP fetch capability.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Lightweight existence check (HEAD, follows redirects).
    async fn probe(&self, url: &str) -> Result<ProbeResponse, FetchError>;

    /// Fetch a page as text. Non-2xx statuses are errors.
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Fetch a document or image as bytes. Non-2xx statuses are errors.
    async fn fetch_bytes(&self, url: &str) -> Result<FetchedBody, FetchError>;
}

/// reqwest-backed fetcher.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .gzip(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn probe(&self, url: &str) -> Result<ProbeResponse, FetchError> {
        let response = self
            .client
            .head(url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        Ok(ProbeResponse {
            status: response.status().as_u16(),
            content_type,
        })
    }

    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).timeout(FETCH_TIMEOUT).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        Ok(response.text().await?)
    }

    async fn fetch_bytes(&self, url: &str) -> Result<FetchedBody, FetchError> {
        let response = self.client.get(url).timeout(FETCH_TIMEOUT).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = response.bytes().await?.to_vec();
        Ok(FetchedBody {
            bytes,
            content_type,
        })
    }
}
