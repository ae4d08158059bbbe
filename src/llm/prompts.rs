//! Prompts for the vision and text model calls.

/// Prompt for extracting raw text from a menu image.
pub const OCR_PROMPT: &str = r#"Extract all menu items, prices, and descriptions from this menu image.
Return the text exactly as it appears, preserving the structure and organization.
Focus on food items, prices, and any descriptions."#;

/// Prompt for structuring raw menu text into JSON. Uses a {menu_text} placeholder.
pub const STRUCTURE_PROMPT: &str = r#"Convert this menu text into a structured JSON format.
Return a JSON object with this structure:
{
  "sections": [
    {
      "section_name": "Section Name",
      "items": [
        {
          "name": "Item Name",
          "price": "$XX.XX",
          "description": "Item description (optional)"
        }
      ]
    }
  ]
}

Menu text:
{menu_text}

Return ONLY the JSON object, no additional text."#;

/// Prompt for summarizing a structured menu. Uses a {menu_json} placeholder.
pub const SUMMARY_PROMPT: &str = r#"Analyze this restaurant menu and provide a concise 3-5 sentence summary.
Include:
- Popular or signature items (if identifiable)
- Dietary options (vegetarian, vegan, gluten-free)
- Price range (approximate $ to $$$)
- Any notable features or specialties

Menu data:
{menu_json}

Return only the summary, no additional formatting."#;
