//! Menu structuring and summarization on top of the model capability.
//!
//! This is the only place untyped model output crosses into the typed core:
//! responses are fence-stripped, parsed, and validated here before a
//! `StructuredMenu` is handed back to the pipeline.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::client::{LanguageModel, LlmError};
use super::prompts::{OCR_PROMPT, STRUCTURE_PROMPT, SUMMARY_PROMPT};
use crate::models::{MenuItem, MenuSection, StructuredMenu};

/// Maximum characters of raw menu text sent to the structuring model.
const MAX_STRUCTURE_CHARS: usize = 12000;

/// Errors turning raw text into a structured menu.
#[derive(Debug, Error)]
pub enum StructuringError {
    #[error(transparent)]
    Model(#[from] LlmError),

    #[error("model response not menu-shaped: {0}")]
    Parse(String),
}

/// Wire shape of the structuring response. Field names match the prompt
/// contract, not the core model.
#[derive(Debug, Deserialize)]
struct MenuWire {
    #[serde(default)]
    sections: Vec<SectionWire>,
}

#[derive(Debug, Deserialize)]
struct SectionWire {
    #[serde(default)]
    section_name: String,
    #[serde(default)]
    items: Vec<ItemWire>,
}

#[derive(Debug, Deserialize)]
struct ItemWire {
    name: Option<String>,
    price: Option<serde_json::Value>,
    description: Option<String>,
}

/// Strip markdown code-fence markers wrapping a model response.
pub fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    inner.trim()
}

/// Parse a (possibly fenced) structuring response into a `StructuredMenu`.
pub fn parse_menu_json(response: &str) -> Result<StructuredMenu, StructuringError> {
    let stripped = strip_code_fences(response);
    let wire: MenuWire =
        serde_json::from_str(stripped).map_err(|e| StructuringError::Parse(e.to_string()))?;

    let sections = wire
        .sections
        .into_iter()
        .map(|section| MenuSection {
            name: section.section_name,
            items: section
                .items
                .into_iter()
                .filter_map(|item| {
                    let name = item.name.filter(|n| !n.trim().is_empty())?;
                    Some(MenuItem {
                        name,
                        price: item.price.and_then(price_to_string),
                        description: item.description.filter(|d| !d.trim().is_empty()),
                    })
                })
                .collect(),
        })
        .collect();

    Ok(StructuredMenu { sections })
}

/// Prices arrive as strings or bare numbers depending on the model's mood.
fn price_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Truncate text to the structuring limit at a valid UTF-8 boundary.
fn truncate_content(text: &str) -> &str {
    if text.len() <= MAX_STRUCTURE_CHARS {
        return text;
    }
    let mut end = MAX_STRUCTURE_CHARS;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Ask the model to structure raw menu text, then validate the response.
pub async fn structure_menu_text(
    model: &dyn LanguageModel,
    text: &str,
) -> Result<StructuredMenu, StructuringError> {
    let prompt = STRUCTURE_PROMPT.replace("{menu_text}", truncate_content(text));
    let response = model.complete(&prompt).await?;
    parse_menu_json(&response)
}

/// Extract text from a menu image via the vision capability.
pub async fn ocr_image(model: &dyn LanguageModel, image: &[u8]) -> Result<String, LlmError> {
    model.complete_with_image(OCR_PROMPT, image).await
}

/// Generate a short prose summary of a structured menu.
pub async fn summarize_menu(
    model: &dyn LanguageModel,
    menu: &StructuredMenu,
) -> Result<String, LlmError> {
    let menu_json = serde_json::to_string_pretty(&menu.sections)
        .map_err(|e| LlmError::Parse(e.to_string()))?;
    let prompt = SUMMARY_PROMPT.replace("{menu_json}", &menu_json);

    let response = model.complete(&prompt).await?;
    let summary = response.trim().to_string();
    if summary.is_empty() {
        return Err(LlmError::Parse("Empty summary response".to_string()));
    }
    debug!("Generated {}-char menu summary", summary.len());
    Ok(summary)
}

/// Fallback summary when summarization is unavailable or fails.
pub fn placeholder_summary(model_enabled: bool) -> String {
    if model_enabled {
        "Menu data available (summary generation failed)".to_string()
    } else {
        "Menu data available (no summary generated - language model disabled)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        let fenced = "```json\n{\"sections\": []}\n```";
        assert_eq!(strip_code_fences(fenced), "{\"sections\": []}");

        let bare_fence = "```\n{\"sections\": []}\n```";
        assert_eq!(strip_code_fences(bare_fence), "{\"sections\": []}");

        let unfenced = "  {\"sections\": []}  ";
        assert_eq!(strip_code_fences(unfenced), "{\"sections\": []}");
    }

    #[test]
    fn test_parse_fenced_menu() {
        let response = r#"```json
{
  "sections": [
    {
      "section_name": "Entrees",
      "items": [
        {"name": "Pad Thai", "price": "$12.50", "description": "peanut sauce"},
        {"name": "Green Curry", "price": 14.5}
      ]
    }
  ]
}
```"#;
        let menu = parse_menu_json(response).unwrap();
        assert_eq!(menu.sections.len(), 1);
        assert_eq!(menu.sections[0].items.len(), 2);
        assert_eq!(menu.sections[0].items[0].price.as_deref(), Some("$12.50"));
        // Numeric prices are stringified.
        assert_eq!(menu.sections[0].items[1].price.as_deref(), Some("14.5"));
    }

    #[test]
    fn test_parse_prose_fails_cleanly() {
        let response = "I'm sorry, I couldn't find a menu in that text.";
        assert!(matches!(
            parse_menu_json(response),
            Err(StructuringError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_skips_nameless_items() {
        let response =
            r#"{"sections": [{"section_name": "Sides", "items": [{"price": "$3"}, {"name": "Rice"}]}]}"#;
        let menu = parse_menu_json(response).unwrap();
        assert_eq!(menu.sections[0].items.len(), 1);
        assert_eq!(menu.sections[0].items[0].name, "Rice");
    }

    #[test]
    fn test_placeholder_summaries() {
        assert!(placeholder_summary(true).contains("failed"));
        assert!(placeholder_summary(false).contains("disabled"));
    }
}
