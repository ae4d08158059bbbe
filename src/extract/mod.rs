//! Menu extraction tiers.
//!
//! Each tier is one strategy for turning a menu URL into a `StructuredMenu`.
//! Tiers are arranged in a fixed priority order and run strictly
//! sequentially; a tier runs only when every earlier tier came up empty,
//! because later tiers are materially more expensive (rendering, OCR,
//! model calls).

mod embedded;
mod heuristic;
mod ocr;
mod structured;

pub use embedded::extract_embedded_images;
pub use heuristic::{extract_heuristic_menu, parse_menu_item};
pub use ocr::extract_document_ocr;
pub use structured::extract_structured_menu;

use futures::future::BoxFuture;
use tracing::debug;

use crate::models::{ScrapeMethod, StructuredMenu};

/// What one extraction tier produced.
#[derive(Debug)]
pub enum TierOutcome {
    /// A menu with at least one section containing at least one item.
    Extracted(StructuredMenu),
    /// Nothing usable; the next tier gets a turn.
    Empty,
}

impl TierOutcome {
    /// Classify a menu by the non-empty-success rule: section headers with
    /// no items do not count as success.
    pub fn from_menu(menu: StructuredMenu) -> Self {
        if menu.has_items() {
            Self::Extracted(menu)
        } else {
            Self::Empty
        }
    }

    pub fn from_option(menu: Option<StructuredMenu>) -> Self {
        match menu {
            Some(m) => Self::from_menu(m),
            None => Self::Empty,
        }
    }
}

/// One extraction strategy, tagged with the provenance it would record.
///
/// The closure is deferred so that skipped tiers do no work at all.
pub struct Tier {
    method: ScrapeMethod,
    run: Box<dyn FnOnce() -> BoxFuture<'static, TierOutcome> + Send>,
}

impl Tier {
    pub fn new<F>(method: ScrapeMethod, run: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, TierOutcome> + Send + 'static,
    {
        Self {
            method,
            run: Box::new(run),
        }
    }

    pub fn method(&self) -> ScrapeMethod {
        self.method
    }
}

/// Run tiers in order, returning the first non-empty result and its
/// provenance tag. Later tiers are never started once one succeeds.
pub async fn first_non_empty(tiers: Vec<Tier>) -> Option<(StructuredMenu, ScrapeMethod)> {
    for tier in tiers {
        let method = tier.method;
        debug!("Running extraction tier: {}", method.as_str());
        match (tier.run)().await {
            TierOutcome::Extracted(menu) => {
                debug!(
                    "Tier {} extracted {} items",
                    method.as_str(),
                    menu.item_count()
                );
                return Some((menu, method));
            }
            TierOutcome::Empty => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MenuItem, MenuSection};
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn one_item_menu() -> StructuredMenu {
        StructuredMenu {
            sections: vec![MenuSection {
                name: "Mains".to_string(),
                items: vec![MenuItem {
                    name: "Burger".to_string(),
                    price: None,
                    description: None,
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let later_ran = Arc::new(AtomicUsize::new(0));
        let counter = later_ran.clone();

        let tiers = vec![
            Tier::new(ScrapeMethod::StructuredHtml, || {
                async { TierOutcome::from_menu(one_item_menu()) }.boxed()
            }),
            Tier::new(ScrapeMethod::HeuristicHtml, move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { TierOutcome::Empty }.boxed()
            }),
        ];

        let (menu, method) = first_non_empty(tiers).await.unwrap();
        assert_eq!(method, ScrapeMethod::StructuredHtml);
        assert!(menu.has_items());
        assert_eq!(later_ran.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_sections_do_not_win() {
        let vacuous = StructuredMenu {
            sections: vec![MenuSection {
                name: "Dinner".to_string(),
                items: vec![],
            }],
        };
        let tiers = vec![
            Tier::new(ScrapeMethod::StructuredHtml, move || {
                async move { TierOutcome::from_menu(vacuous) }.boxed()
            }),
            Tier::new(ScrapeMethod::HeuristicHtml, || {
                async { TierOutcome::from_menu(one_item_menu()) }.boxed()
            }),
        ];

        let (_, method) = first_non_empty(tiers).await.unwrap();
        // The vacuous section-header-only menu fell through.
        assert_eq!(method, ScrapeMethod::HeuristicHtml);
    }

    #[tokio::test]
    async fn test_exhaustion_yields_none() {
        let tiers = vec![Tier::new(ScrapeMethod::StructuredHtml, || {
            async { TierOutcome::Empty }.boxed()
        })];
        assert!(first_non_empty(tiers).await.is_none());
    }
}
