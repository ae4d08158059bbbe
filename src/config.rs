//! Configuration management for menuacquire.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::llm::LlmConfig;

/// Application configuration, loadable from a TOML file. Every field has a
/// default so a missing or partial file works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Run the rendering browser headless.
    #[serde(default = "default_headless")]
    pub headless: bool,
    /// Language model settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("menuacquire")
        .join("menus.db")
}

fn default_headless() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            headless: default_headless(),
            llm: LlmConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit path, or defaults when none is
    /// given and no file exists at the standard location.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let standard = dirs::config_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join("menuacquire")
                    .join("config.toml");
                if !standard.exists() {
                    return Ok(Self::default());
                }
                standard
            }
        };

        let raw = fs::read_to_string(&path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Create the database's parent directory if needed.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        if let Some(parent) = self.db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            db_path = "/tmp/menus.db"

            [llm]
            model = "qwen2.5:14b"
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/tmp/menus.db"));
        assert!(config.headless);
        assert_eq!(config.llm.model, "qwen2.5:14b");
        assert_eq!(config.llm.endpoint, "http://localhost:11434");
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.headless);
        assert!(config.llm.enabled);
    }
}
