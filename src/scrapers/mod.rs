//! Fetch and render capabilities for menu acquisition.

pub mod browser;
mod http_client;

pub use browser::{BrowserConfig, BrowserFetcher, RenderError, Renderer};
pub use http_client::{FetchError, Fetcher, FetchedBody, HttpClient, ProbeResponse, USER_AGENT};
