//! Menu models for structured menu storage and caching.
//!
//! A restaurant's menu is stored as one record per place, overwritten on
//! every acquisition. Freshness of a cached record is a pure function of
//! its scrape timestamp and status against a fixed TTL.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Cache TTL in days. A successful record older than this is stale and
/// eligible for re-acquisition. Failed records are never fresh.
pub const CACHE_TTL_DAYS: i64 = 7;

/// A single dish on a menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Item name as printed on the menu.
    pub name: String,
    /// Free-form price string (e.g. "$12.50"), if one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Item description, if one was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A named group of menu items, in presentation order.
///
/// Section names need not be unique; order is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuSection {
    /// Section heading (e.g. "Appetizers").
    pub name: String,
    /// Items in presentation order.
    pub items: Vec<MenuItem>,
}

/// A normalized menu: an ordered list of sections. Never null, may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredMenu {
    pub sections: Vec<MenuSection>,
}

impl StructuredMenu {
    /// True iff at least one section contains at least one item.
    ///
    /// This is the sole criterion for whether an extraction tier succeeded.
    /// Vacuous section headers with no items do not count.
    pub fn has_items(&self) -> bool {
        self.sections.iter().any(|s| !s.items.is_empty())
    }

    /// Total item count across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}

/// Which extraction tier produced a menu record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeMethod {
    StructuredHtml,
    HeuristicHtml,
    DynamicRender,
    OcrEmbedded,
    OcrPdf,
    OcrImage,
    Error,
}

impl ScrapeMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StructuredHtml => "structured_html",
            Self::HeuristicHtml => "heuristic_html",
            Self::DynamicRender => "dynamic_render",
            Self::OcrEmbedded => "ocr_embedded",
            Self::OcrPdf => "ocr_pdf",
            Self::OcrImage => "ocr_image",
            Self::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "structured_html" => Some(Self::StructuredHtml),
            "heuristic_html" => Some(Self::HeuristicHtml),
            "dynamic_render" => Some(Self::DynamicRender),
            "ocr_embedded" => Some(Self::OcrEmbedded),
            "ocr_pdf" => Some(Self::OcrPdf),
            "ocr_image" => Some(Self::OcrImage),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Coarse outcome of an acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeStatus {
    Success,
    Failed,
}

impl ScrapeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// The persisted menu record, one per place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuRecord {
    /// Opaque place identifier (primary key).
    pub place_id: String,
    /// URL the menu was (or would have been) scraped from.
    pub menu_url: Option<String>,
    /// Normalized menu data. Empty on failed acquisitions.
    pub menu_data: StructuredMenu,
    /// Short prose summary of the menu.
    pub menu_summary: String,
    /// When the acquisition ran.
    pub scrape_timestamp: DateTime<Utc>,
    /// Which tier produced the data.
    pub scrape_method: ScrapeMethod,
    /// Whether the acquisition succeeded.
    pub scrape_status: ScrapeStatus,
    /// Human-readable failure reason, for failed records.
    pub error_message: Option<String>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
}

impl MenuRecord {
    /// Create a successful record stamped with the current time.
    pub fn success(
        place_id: String,
        menu_url: Option<String>,
        menu_data: StructuredMenu,
        menu_summary: String,
        scrape_method: ScrapeMethod,
    ) -> Self {
        let now = Utc::now();
        Self {
            place_id,
            menu_url,
            menu_data,
            menu_summary,
            scrape_timestamp: now,
            scrape_method,
            scrape_status: ScrapeStatus::Success,
            error_message: None,
            updated_at: now,
        }
    }

    /// Create a failed record stamped with the current time.
    pub fn failed(place_id: String, menu_url: Option<String>, error_message: String) -> Self {
        let now = Utc::now();
        Self {
            place_id,
            menu_url,
            menu_data: StructuredMenu::default(),
            menu_summary: String::new(),
            scrape_timestamp: now,
            scrape_method: ScrapeMethod::Error,
            scrape_status: ScrapeStatus::Failed,
            error_message: Some(error_message),
            updated_at: now,
        }
    }

    /// Freshness rule: a record is fresh iff it succeeded and its scrape
    /// timestamp is within the TTL window of `now`. No other field matters.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.scrape_status == ScrapeStatus::Success
            && now - self.scrape_timestamp <= Duration::days(CACHE_TTL_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(ts: DateTime<Utc>, status: ScrapeStatus) -> MenuRecord {
        MenuRecord {
            place_id: "p1".to_string(),
            menu_url: None,
            menu_data: StructuredMenu::default(),
            menu_summary: String::new(),
            scrape_timestamp: ts,
            scrape_method: ScrapeMethod::HeuristicHtml,
            scrape_status: status,
            error_message: None,
            updated_at: ts,
        }
    }

    #[test]
    fn test_freshness_boundary() {
        let now = Utc::now();

        let just_inside = record_at(
            now - Duration::days(CACHE_TTL_DAYS) + Duration::seconds(1),
            ScrapeStatus::Success,
        );
        assert!(just_inside.is_fresh(now));

        let just_outside = record_at(
            now - Duration::days(CACHE_TTL_DAYS) - Duration::seconds(1),
            ScrapeStatus::Success,
        );
        assert!(!just_outside.is_fresh(now));
    }

    #[test]
    fn test_failed_records_never_fresh() {
        let now = Utc::now();
        let rec = record_at(now, ScrapeStatus::Failed);
        assert!(!rec.is_fresh(now));
    }

    #[test]
    fn test_has_items_ignores_empty_sections() {
        let mut menu = StructuredMenu::default();
        assert!(!menu.has_items());

        menu.sections.push(MenuSection {
            name: "Appetizers".to_string(),
            items: vec![],
        });
        // Section headers alone do not make a menu.
        assert!(!menu.has_items());

        menu.sections.push(MenuSection {
            name: "Entrees".to_string(),
            items: vec![MenuItem {
                name: "Pad Thai".to_string(),
                price: Some("$12.50".to_string()),
                description: None,
            }],
        });
        assert!(menu.has_items());
        assert_eq!(menu.item_count(), 1);
    }

    #[test]
    fn test_scrape_method_roundtrip() {
        for m in [
            ScrapeMethod::StructuredHtml,
            ScrapeMethod::HeuristicHtml,
            ScrapeMethod::DynamicRender,
            ScrapeMethod::OcrEmbedded,
            ScrapeMethod::OcrPdf,
            ScrapeMethod::OcrImage,
            ScrapeMethod::Error,
        ] {
            assert_eq!(ScrapeMethod::from_str(m.as_str()), Some(m));
        }
        assert_eq!(ScrapeMethod::from_str("bogus"), None);
    }
}
