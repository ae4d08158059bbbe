//! Heuristic menu extraction from plain HTML.
//!
//! Headings (h2-h4) delimit sections; the elements between one heading and
//! the next are searched for list/container elements whose class looks
//! item-like. Navigation chrome and non-menu headings (about, contact,
//! location, hours) are excluded.

use std::sync::LazyLock;

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::models::{MenuItem, MenuSection, StructuredMenu};

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\s*\d+\.?\d*").unwrap());
static ITEM_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(menu-item|dish|food|item)").unwrap());

/// Heading keywords that mark non-menu page sections.
const SKIP_HEADINGS: &[&str] = &["about", "contact", "location", "hours"];

/// Page chrome whose headings and text never belong to the menu.
const CHROME_TAGS: &[&str] = &["nav", "header", "footer"];

const HEADING_TAGS: &[&str] = &["h2", "h3", "h4"];

/// Extract a menu from static HTML by walking heading-delimited sections.
pub fn extract_heuristic_menu(html: &str) -> StructuredMenu {
    let document = Html::parse_document(html);
    let heading_selector = Selector::parse("h2, h3, h4").expect("valid selector");
    let candidate_selector = Selector::parse("li, div").expect("valid selector");

    let mut sections = Vec::new();

    for heading in document.select(&heading_selector) {
        if inside_chrome(heading) {
            continue;
        }

        let section_name = element_text(heading).trim().to_string();
        if section_name.is_empty() || is_skipped_heading(&section_name) {
            continue;
        }

        let mut items = Vec::new();
        let mut node = heading.next_sibling();
        while let Some(sibling) = node {
            if let Some(element) = ElementRef::wrap(sibling) {
                if HEADING_TAGS.contains(&element.value().name()) {
                    break;
                }
                for candidate in element.select(&candidate_selector) {
                    let class = candidate.value().attr("class").unwrap_or("");
                    if !ITEM_CLASS_RE.is_match(class) {
                        continue;
                    }
                    if let Some(item) = parse_menu_item(&element_text(candidate)) {
                        items.push(item);
                    }
                }
            }
            node = sibling.next_sibling();
        }

        if !items.is_empty() {
            sections.push(MenuSection {
                name: section_name,
                items,
            });
        }
    }

    StructuredMenu { sections }
}

/// Parse one item element's text into name/price/description.
///
/// Multi-line text: first non-empty line (price removed) is the name, the
/// second is the description. A single line with an embedded price splits
/// around it: text before the price is the name, text after it (with
/// separator punctuation trimmed) is the description.
pub fn parse_menu_item(text: &str) -> Option<MenuItem> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let first = *lines.first()?;

    if lines.len() >= 2 {
        let price = PRICE_RE.find(text).map(|m| m.as_str().to_string());
        let name = trim_separators(&PRICE_RE.replace(first, ""));
        if name.is_empty() {
            return None;
        }
        return Some(MenuItem {
            name,
            price,
            description: Some(lines[1].to_string()),
        });
    }

    match PRICE_RE.find(first) {
        Some(m) => {
            let name = trim_separators(&first[..m.start()]);
            if name.is_empty() {
                return None;
            }
            let description = trim_separators(&first[m.end()..]);
            Some(MenuItem {
                name,
                price: Some(m.as_str().to_string()),
                description: (!description.is_empty()).then_some(description),
            })
        }
        None => Some(MenuItem {
            name: first.to_string(),
            price: None,
            description: None,
        }),
    }
}

/// Trim whitespace plus leading/trailing separator punctuation.
fn trim_separators(s: &str) -> String {
    s.trim()
        .trim_matches(|c: char| matches!(c, '-' | '–' | '—' | ':' | '•' | '·' | '|' | ','))
        .trim()
        .to_string()
}

fn is_skipped_heading(name: &str) -> bool {
    let lower = name.to_lowercase();
    SKIP_HEADINGS.iter().any(|skip| lower.contains(skip))
}

/// True when the element sits inside nav/header/footer chrome.
fn inside_chrome(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| CHROME_TAGS.contains(&a.value().name()))
}

/// Text content of an element, skipping script/style subtrees.
fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(e) if matches!(e.name(), "script" | "style") => {}
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    collect_text(el, out);
                }
            }
            _ => {}
        }
    }
}
