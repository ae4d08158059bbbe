//! Structured-data menu extraction from schema.org JSON-LD markup.

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::models::{MenuItem, MenuSection, StructuredMenu};

/// Extract a menu from embedded schema.org `Menu` JSON-LD, if any.
///
/// Scans every `<script type="application/ld+json">` block; the first
/// object (or array element) typed `Menu` wins. Returns an empty menu when
/// no such markup exists.
pub fn extract_structured_menu(html: &str) -> StructuredMenu {
    let document = Html::parse_document(html);
    let selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector");

    for script in document.select(&selector) {
        let raw: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&raw) else {
            debug!("Skipping unparseable ld+json block");
            continue;
        };

        for candidate in ld_candidates(&value) {
            if candidate.get("@type").and_then(Value::as_str) == Some("Menu") {
                let menu = map_menu(candidate);
                if !menu.sections.is_empty() {
                    return menu;
                }
            }
        }
    }

    StructuredMenu::default()
}

/// JSON-LD blocks are sometimes a single object, sometimes an array.
fn ld_candidates(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn map_menu(menu: &Value) -> StructuredMenu {
    let sections = menu
        .get("hasMenuSection")
        .and_then(Value::as_array)
        .map(|sections| sections.iter().map(map_section).collect())
        .unwrap_or_default();
    StructuredMenu { sections }
}

fn map_section(section: &Value) -> MenuSection {
    let items = section
        .get("hasMenuItem")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(map_item).collect())
        .unwrap_or_default();

    MenuSection {
        name: text_field(section, "name").unwrap_or_default(),
        items,
    }
}

fn map_item(item: &Value) -> Option<MenuItem> {
    let name = text_field(item, "name")?;
    let price = item
        .get("offers")
        .and_then(|offers| offers.get("price"))
        .and_then(value_to_string);

    Some(MenuItem {
        name,
        price,
        description: text_field(item, "description"),
    })
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// schema.org prices appear as strings or bare numbers.
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
