//! Acquisition orchestrator.
//!
//! Drives one acquisition end to end: cache check, menu URL discovery,
//! content classification, the extraction tier chain, summarization, and
//! the final upsert. Deterministic and terminal in both branches; every
//! attempt ends in exactly one upsert.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classify::{classify_url, ContentKind};
use crate::discovery::{discover_menu_url, DiscoveryError};
use crate::extract::{
    extract_document_ocr, extract_embedded_images, extract_heuristic_menu,
    extract_structured_menu, first_non_empty, Tier, TierOutcome,
};
use crate::llm::{placeholder_summary, summarize_menu, LanguageModel};
use crate::models::{MenuRecord, PlaceDirectory, ScrapeMethod, StructuredMenu};
use crate::repository::{CacheLookup, MenuRepository};
use crate::scrapers::{Fetcher, Renderer};

const NO_MENU_URL_MESSAGE: &str =
    "Menu URL not found. Restaurant may not have an online menu.";
const EXTRACTION_EMPTY_MESSAGE: &str = "Unable to extract menu data from website";

/// Overall outcome of an acquisition call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquireStatus {
    CacheHit,
    Success,
    Failed,
}

/// What the caller gets back. Serializes to the external JSON contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquireResponse {
    pub status: AcquireStatus,
    pub place_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu_data: Option<StructuredMenu>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scrape_method: Option<ScrapeMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AcquireResponse {
    fn cache_hit(record: MenuRecord) -> Self {
        Self::from_record(AcquireStatus::CacheHit, record)
    }

    fn success(record: MenuRecord) -> Self {
        Self::from_record(AcquireStatus::Success, record)
    }

    fn from_record(status: AcquireStatus, record: MenuRecord) -> Self {
        Self {
            status,
            place_id: record.place_id,
            menu_url: record.menu_url,
            summary: Some(record.menu_summary),
            menu_data: Some(record.menu_data),
            scrape_method: Some(record.scrape_method),
            last_updated: Some(record.scrape_timestamp),
            message: None,
        }
    }

    fn failed(record: MenuRecord) -> Self {
        Self {
            status: AcquireStatus::Failed,
            place_id: record.place_id,
            menu_url: record.menu_url,
            summary: None,
            menu_data: None,
            scrape_method: None,
            last_updated: None,
            message: record.error_message,
        }
    }
}

/// Orchestrates menu acquisitions against injected capabilities.
///
/// Holds no global state; everything it needs is passed in at construction.
pub struct AcquisitionService {
    repo: Arc<MenuRepository>,
    places: Arc<dyn PlaceDirectory>,
    fetcher: Arc<dyn Fetcher>,
    renderer: Arc<dyn Renderer>,
    model: Arc<dyn LanguageModel>,
}

impl AcquisitionService {
    pub fn new(
        repo: Arc<MenuRepository>,
        places: Arc<dyn PlaceDirectory>,
        fetcher: Arc<dyn Fetcher>,
        renderer: Arc<dyn Renderer>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            repo,
            places,
            fetcher,
            renderer,
            model,
        }
    }

    /// Acquire the menu for a place.
    ///
    /// With `use_cache`, a fresh cached record short-circuits the whole
    /// pipeline. A cache bypass skips the read but never the write: the
    /// outcome is always persisted.
    pub async fn acquire(&self, place_id: &str, use_cache: bool) -> AcquireResponse {
        if use_cache {
            match self.repo.lookup(place_id, Utc::now()) {
                Ok(CacheLookup::Fresh(record)) => {
                    info!("Cache hit for place: {}", place_id);
                    return AcquireResponse::cache_hit(record);
                }
                Ok(_) => {}
                Err(e) => warn!("Cache lookup failed for {}: {}", place_id, e),
            }
        }

        let Some(place) = self.places.place_details(place_id).await else {
            return self.persist_failed(place_id, None, NO_MENU_URL_MESSAGE);
        };

        let menu_url = match discover_menu_url(&place, self.fetcher.as_ref()).await {
            Ok(url) => url,
            Err(DiscoveryError::NoWebsite) => {
                return self.persist_failed(place_id, None, NO_MENU_URL_MESSAGE);
            }
        };
        info!("Found menu URL for {}: {}", place_id, menu_url);

        let kind = classify_url(&menu_url, self.fetcher.as_ref()).await;
        let tiers = self.build_tiers(&menu_url, kind).await;

        let Some((menu, method)) = first_non_empty(tiers).await else {
            return self.persist_failed(place_id, Some(menu_url), EXTRACTION_EMPTY_MESSAGE);
        };
        info!(
            "Extracted {} items for {} via {}",
            menu.item_count(),
            place_id,
            method.as_str()
        );

        let summary = if self.model.is_enabled() {
            match summarize_menu(self.model.as_ref(), &menu).await {
                Ok(summary) => summary,
                Err(e) => {
                    warn!("Summary generation failed for {}: {}", place_id, e);
                    placeholder_summary(true)
                }
            }
        } else {
            placeholder_summary(false)
        };

        let record = MenuRecord::success(
            place_id.to_string(),
            Some(menu_url),
            menu,
            summary,
            method,
        );
        if let Err(e) = self.repo.upsert(&record) {
            // Losing the cache write is recoverable on the next request;
            // the caller still gets the in-memory result.
            warn!("Failed to persist menu for {}: {}", place_id, e);
        }
        AcquireResponse::success(record)
    }

    /// The applicable tier chain for a classified URL.
    ///
    /// HTML pages get the full fallback chain; PDF and image URLs go
    /// straight to document OCR. The static page is fetched once and shared
    /// by the structured and heuristic tiers.
    async fn build_tiers(&self, menu_url: &str, kind: ContentKind) -> Vec<Tier> {
        match kind {
            ContentKind::Html => {
                let page_html = Arc::new(match self.fetcher.fetch_text(menu_url).await {
                    Ok(html) => Some(html),
                    Err(e) => {
                        warn!("Static fetch failed for {}: {}", menu_url, e);
                        None
                    }
                });

                let structured_html = page_html.clone();
                let heuristic_html = page_html;
                let render_url = menu_url.to_string();
                let renderer = self.renderer.clone();
                let embedded_url = menu_url.to_string();
                let fetcher = self.fetcher.clone();
                let model = self.model.clone();

                vec![
                    Tier::new(ScrapeMethod::StructuredHtml, move || {
                        async move {
                            match structured_html.as_deref() {
                                Some(html) => TierOutcome::from_menu(extract_structured_menu(html)),
                                None => TierOutcome::Empty,
                            }
                        }
                        .boxed()
                    }),
                    Tier::new(ScrapeMethod::HeuristicHtml, move || {
                        async move {
                            match heuristic_html.as_deref() {
                                Some(html) => TierOutcome::from_menu(extract_heuristic_menu(html)),
                                None => TierOutcome::Empty,
                            }
                        }
                        .boxed()
                    }),
                    Tier::new(ScrapeMethod::DynamicRender, move || {
                        async move {
                            match renderer.render(&render_url).await {
                                Ok(dom) => TierOutcome::from_menu(extract_heuristic_menu(&dom)),
                                Err(e) => {
                                    warn!("Render failed for {}: {}", render_url, e);
                                    TierOutcome::Empty
                                }
                            }
                        }
                        .boxed()
                    }),
                    Tier::new(ScrapeMethod::OcrEmbedded, move || {
                        async move {
                            TierOutcome::from_option(
                                extract_embedded_images(
                                    &embedded_url,
                                    fetcher.as_ref(),
                                    model.as_ref(),
                                )
                                .await,
                            )
                        }
                        .boxed()
                    }),
                ]
            }
            ContentKind::Pdf | ContentKind::Image => {
                let method = if kind == ContentKind::Pdf {
                    ScrapeMethod::OcrPdf
                } else {
                    ScrapeMethod::OcrImage
                };
                let url = menu_url.to_string();
                let fetcher = self.fetcher.clone();
                let model = self.model.clone();
                vec![Tier::new(method, move || {
                    async move {
                        TierOutcome::from_option(
                            extract_document_ocr(&url, kind, fetcher.as_ref(), model.as_ref())
                                .await,
                        )
                    }
                    .boxed()
                })]
            }
        }
    }

    /// Persist a failed record and build the failed response from it.
    fn persist_failed(
        &self,
        place_id: &str,
        menu_url: Option<String>,
        message: &str,
    ) -> AcquireResponse {
        info!("Acquisition failed for {}: {}", place_id, message);
        let record = MenuRecord::failed(place_id.to_string(), menu_url, message.to_string());
        if let Err(e) = self.repo.upsert(&record) {
            warn!("Failed to persist failure record for {}: {}", place_id, e);
        }
        AcquireResponse::failed(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_response_serialization() {
        let record = MenuRecord::failed(
            "p1".to_string(),
            None,
            NO_MENU_URL_MESSAGE.to_string(),
        );
        let response = AcquireResponse::failed(record);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["place_id"], "p1");
        assert!(json["message"].as_str().unwrap().contains("Menu URL not found"));
        // Absent fields are omitted, not null.
        assert!(json.get("menu_data").is_none());
        assert!(json.get("scrape_method").is_none());
    }

    #[test]
    fn test_success_response_serialization() {
        let record = MenuRecord::success(
            "p1".to_string(),
            Some("https://thai.example/menu".to_string()),
            StructuredMenu::default(),
            "Short summary.".to_string(),
            ScrapeMethod::DynamicRender,
        );
        let response = AcquireResponse::success(record);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["scrape_method"], "dynamic_render");
        assert_eq!(json["summary"], "Short summary.");
        assert!(json.get("message").is_none());
    }
}
