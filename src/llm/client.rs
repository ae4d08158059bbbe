//! LLM client for menu structuring, summarization, and vision OCR.
//!
//! Supports Ollama API for local inference. Vision calls send the image as
//! a base64 payload alongside the prompt.

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors from language-model calls.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("LLM disabled")]
    Disabled,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Text and vision completion capability.
///
/// `complete` runs a plain text prompt; `complete_with_image` additionally
/// attaches one image for vision models. Both return the raw model text —
/// validation of any expected structure happens in the caller.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// False when no model is configured; callers degrade gracefully.
    fn is_enabled(&self) -> bool;

    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    async fn complete_with_image(&self, prompt: &str, image: &[u8]) -> Result<String, LlmError>;
}

/// Configuration for the LLM client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Whether model calls are enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Ollama API endpoint (default: http://localhost:11434)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model used for structuring and summarization
    #[serde(default = "default_model")]
    pub model: String,
    /// Vision-capable model used for OCR
    #[serde(default = "default_vision_model")]
    pub vision_model: String,
    /// Maximum tokens in response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_enabled() -> bool {
    true
}
fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "llama3.2:instruct".to_string()
}
fn default_vision_model() -> String {
    "llama3.2-vision".to_string()
}
fn default_max_tokens() -> u32 {
    2048
}
fn default_temperature() -> f32 {
    0.2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            endpoint: default_endpoint(),
            model: default_model(),
            vision_model: default_vision_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

/// LLM client for menu processing.
pub struct OllamaClient {
    config: LlmConfig,
    client: Client,
}

impl OllamaClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // slow models
            .build()
            .expect("Failed to create HTTP client");
        Self { config, client }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn call_generate(
        &self,
        model: &str,
        prompt: &str,
        images: Option<Vec<String>>,
    ) -> Result<String, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }

        let request = OllamaRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
            images,
            options: OllamaOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.config.endpoint);
        debug!("Calling {} with model {}", url, model);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let ollama_resp: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(ollama_resp.response)
    }
}

#[async_trait]
impl LanguageModel for OllamaClient {
    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.call_generate(&self.config.model, prompt, None).await
    }

    async fn complete_with_image(&self, prompt: &str, image: &[u8]) -> Result<String, LlmError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        self.call_generate(&self.config.vision_model, prompt, Some(vec![encoded]))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LlmConfig::default();
        assert!(config.enabled);
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert!(config.temperature < 1.0);
    }

    #[test]
    fn test_config_from_toml_partial() {
        let config: LlmConfig = toml::from_str("model = \"qwen2.5:14b\"").unwrap();
        assert_eq!(config.model, "qwen2.5:14b");
        // Unspecified fields take their defaults.
        assert!(config.enabled);
        assert_eq!(config.endpoint, "http://localhost:11434");
    }
}
