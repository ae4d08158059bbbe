//! Menu URL discovery.
//!
//! Resolves a candidate menu document URL for a place, cheapest signal
//! first: an explicitly stored menu link, then common URL paths probed with
//! a lightweight existence check, then a scan of the homepage for menu-like
//! anchors, and finally the bare website itself.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use crate::models::PlaceDetails;
use crate::scrapers::Fetcher;

/// Common menu URL paths, probed in order.
const COMMON_MENU_PATHS: &[&str] = &[
    "/menu",
    "/menus",
    "/food",
    "/our-menu",
    "/menu.html",
    "/menu.php",
];

static MENU_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(menu|food|dish)").unwrap());

/// Discovery failure: nothing to resolve a URL from.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no website or stored menu link for this place")]
    NoWebsite,
}

/// Resolve a menu URL for a place. Fails only when neither a stored menu
/// link nor a website is known; probe and fetch failures along the way just
/// move resolution to the next step.
pub async fn discover_menu_url(
    place: &PlaceDetails,
    fetcher: &dyn Fetcher,
) -> Result<String, DiscoveryError> {
    // Stored menu link is authoritative.
    if let Some(link) = place.menu_link.as_deref().filter(|l| !l.is_empty()) {
        debug!("Using stored menu link: {}", link);
        return Ok(link.to_string());
    }

    let website = place
        .website
        .as_deref()
        .filter(|w| !w.is_empty())
        .ok_or(DiscoveryError::NoWebsite)?;

    // Probe common menu paths.
    let base = website.trim_end_matches('/');
    for path in COMMON_MENU_PATHS {
        let candidate = format!("{}{}", base, path);
        match fetcher.probe(&candidate).await {
            Ok(probe) if probe.is_success() => {
                info!("Found menu at common path: {}", candidate);
                return Ok(candidate);
            }
            Ok(_) => {}
            Err(e) => debug!("Probe failed for {}: {}", candidate, e),
        }
    }

    // Scan the homepage for menu-like anchors.
    match fetcher.fetch_text(website).await {
        Ok(html) => {
            if let Some(found) = find_menu_anchor(&html, website) {
                info!("Found menu link on homepage: {}", found);
                return Ok(found);
            }
        }
        Err(e) => debug!("Homepage fetch failed for {}: {}", website, e),
    }

    // The website itself is the last resort.
    Ok(website.to_string())
}

/// Find the first anchor whose href or text looks menu-related, resolved to
/// an absolute URL against the page base.
fn find_menu_anchor(html: &str, base: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("valid selector");
    let base_url = Url::parse(base).ok()?;

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let text: String = anchor.text().collect();
        if MENU_LINK_RE.is_match(href) || MENU_LINK_RE.is_match(&text) {
            if let Ok(resolved) = base_url.join(href) {
                return Some(resolved.to_string());
            }
        }
    }
    None
}
