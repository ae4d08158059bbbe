//! Language-model capabilities: vision OCR, menu structuring, summarization.

mod client;
mod prompts;
mod structuring;

pub use client::{LanguageModel, LlmConfig, LlmError, OllamaClient};
pub use prompts::{OCR_PROMPT, STRUCTURE_PROMPT, SUMMARY_PROMPT};
pub use structuring::{
    ocr_image, parse_menu_json, placeholder_summary, strip_code_fences, structure_menu_text,
    summarize_menu, StructuringError,
};
