//! Embedded-image OCR extraction.
//!
//! Some restaurant sites publish the menu only as an image on an otherwise
//! empty page. This tier scans the page for likely menu images, OCRs the
//! candidates, and structures the first one that yields substantial text.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::llm::{ocr_image, structure_menu_text, LanguageModel};
use crate::models::StructuredMenu;
use crate::scrapers::Fetcher;

static MENU_IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(menu|food)").unwrap());

/// Minimum OCR text length for an image to count as a menu.
const MIN_OCR_TEXT_CHARS: usize = 100;

/// How many images to try when none look menu-like by URL.
const FALLBACK_IMAGE_LIMIT: usize = 5;

/// OCR embedded images on a page and structure the first promising result.
pub async fn extract_embedded_images(
    page_url: &str,
    fetcher: &dyn Fetcher,
    model: &dyn LanguageModel,
) -> Option<StructuredMenu> {
    let html = match fetcher.fetch_text(page_url).await {
        Ok(html) => html,
        Err(e) => {
            debug!("Page fetch failed for embedded-image scan: {}", e);
            return None;
        }
    };

    let candidates = candidate_image_urls(&html, page_url);
    if candidates.is_empty() {
        return None;
    }
    debug!("Trying {} candidate menu images", candidates.len());

    for image_url in candidates {
        let body = match fetcher.fetch_bytes(&image_url).await {
            Ok(body) => body,
            Err(e) => {
                debug!("Image fetch failed for {}: {}", image_url, e);
                continue;
            }
        };

        let text = match ocr_image(model, &body.bytes).await {
            Ok(text) => text,
            Err(e) => {
                debug!("OCR failed for {}: {}", image_url, e);
                continue;
            }
        };

        if text.trim().len() <= MIN_OCR_TEXT_CHARS {
            continue;
        }

        match structure_menu_text(model, &text).await {
            Ok(menu) if menu.has_items() => return Some(menu),
            Ok(_) => {}
            Err(e) => warn!("Structuring failed for {}: {}", image_url, e),
        }
    }

    None
}

/// Image URLs worth OCRing: those whose src looks menu-related, or failing
/// that, the first few images on the page. Resolved to absolute URLs.
fn candidate_image_urls(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("img[src]").expect("valid selector");
    let base = Url::parse(page_url).ok();

    let sources: Vec<&str> = document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty())
        .collect();

    let menu_like: Vec<&str> = sources
        .iter()
        .copied()
        .filter(|src| MENU_IMG_RE.is_match(src))
        .collect();

    let chosen = if menu_like.is_empty() {
        sources.into_iter().take(FALLBACK_IMAGE_LIMIT).collect()
    } else {
        menu_like
    };

    chosen
        .into_iter()
        .filter_map(|src| match &base {
            Some(base) => base.join(src).ok().map(|u| u.to_string()),
            None => Some(src.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_like_images_preferred() {
        let html = r#"<img src="/img/hero.jpg"><img src="/img/dinner-menu.jpg">
                      <img src="/img/food-specials.png">"#;
        let urls = candidate_image_urls(html, "https://thai.example/");
        assert_eq!(
            urls,
            vec![
                "https://thai.example/img/dinner-menu.jpg",
                "https://thai.example/img/food-specials.png"
            ]
        );
    }

    #[test]
    fn test_first_five_fallback() {
        let html: String = (0..8)
            .map(|i| format!("<img src=\"/img/photo{}.jpg\">", i))
            .collect();
        let urls = candidate_image_urls(&html, "https://thai.example/");
        assert_eq!(urls.len(), 5);
        assert_eq!(urls[0], "https://thai.example/img/photo0.jpg");
    }

    #[test]
    fn test_no_images() {
        assert!(candidate_image_urls("<p>no pictures</p>", "https://thai.example/").is_empty());
    }
}
