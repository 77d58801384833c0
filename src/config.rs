// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Larder

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// AI engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Stocking rules
    #[serde(default)]
    pub rules: StockRules,

    /// Prompt templates
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EngineConfig {
    pub url: String,
    pub models: ModelConfig,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    pub vision: String,
    #[serde(default = "default_text_model")]
    pub text: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StockRules {
    /// Units added to an entry when it is marked purchased.
    #[serde(default = "default_restock_amount")]
    pub restock_amount: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptConfig {
    /// Recognition prompt; `{items}` expands to the joined catalog.
    pub recognize: String,
    /// Forecast prompt; `{items}`, `{names}` and `{date}` are expanded.
    pub forecast: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
}

// Default value functions
fn default_timeout() -> u64 {
    120
}
fn default_text_model() -> String {
    "llama3.2:3b".to_string()
}
fn default_restock_amount() -> u32 {
    5
}
fn default_web_host() -> String {
    "127.0.0.1".to_string()
}
fn default_web_port() -> u16 {
    8080
}

fn default_recognize_prompt() -> String {
    "From the following list of items: {items}. Identify which ones are in \
     the image. For each item found, estimate a plausible integer quantity. \
     Ignore any other items not on the list. Return ONLY a JSON array of \
     objects with \"name\" and \"quantity\" keys."
        .to_string()
}

fn default_forecast_prompt() -> String {
    "For the following list of household items: {names}. Generate a \
     plausible consumption forecast. For each item, predict a 'usageRate' \
     (e.g. '1 unit every 5 days') and a 'reorderDate' based on today's \
     date, which is {date}. Item names must be one of: {items}. Return \
     ONLY a JSON array of objects with \"name\", \"usageRate\" and \
     \"reorderDate\" keys."
        .to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            rules: StockRules::default(),
            prompts: PromptConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434/api/generate".to_string(),
            models: ModelConfig {
                vision: "moondream".to_string(),
                text: default_text_model(),
            },
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for StockRules {
    fn default() -> Self {
        Self {
            restock_amount: default_restock_amount(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            recognize: default_recognize_prompt(),
            forecast: default_forecast_prompt(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::LarderError::Config(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.rules.restock_amount, 5);
        assert_eq!(config.web.port, 8080);
        assert!(config.prompts.recognize.contains("{items}"));
        assert!(config.prompts.forecast.contains("{date}"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.rules.restock_amount = 3;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.rules.restock_amount, 3);
        assert_eq!(loaded.engine.models.vision, "moondream");
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load(Path::new("/nonexistent/larder.json")).unwrap();
        assert_eq!(config.web.host, "127.0.0.1");
    }

    #[test]
    fn test_partial_config_uses_field_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"web": {"port": 9000}}"#).unwrap();
        assert_eq!(config.web.port, 9000);
        assert_eq!(config.web.host, "127.0.0.1");
        assert_eq!(config.rules.restock_amount, 5);
    }
}
