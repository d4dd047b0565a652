// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Sortwise

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder replaced with the comma separated category list
pub const CATEGORIES_PLACEHOLDER: &str = "{categories}";

/// Placeholder replaced with the quoted file name
pub const FILE_NAME_PLACEHOLDER: &str = "{file_name}";

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// AI engine configuration
    pub ai_engine: EngineConfig,

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
    #[serde(default = "default_model")]
    pub model: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PromptConfig {
    #[serde(default = "default_classify_prompt")]
    pub classify: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Let the web UI open server-side folders by path
    #[serde(default = "default_true")]
    pub allow_folder_pick: bool,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

// Default value functions
fn default_model() -> String { "llama3.2:3b".to_string() }
fn default_true() -> bool { true }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8080 }
fn default_max_upload_bytes() -> usize { 256 * 1024 * 1024 }

fn default_classify_prompt() -> String {
    "You are an expert file organizer. Classify the following file name into one of these \
     categories: {categories}.\n\
     File name: \"{file_name}\"\n\n\
     Respond with ONLY the category name and nothing else. If you are unsure, classify it as \
     \"Other\"."
        .to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ai_engine: EngineConfig {
                url: "http://localhost:11434".to_string(),
                model: default_model(),
            },
            prompts: PromptConfig::default(),
            web: WebConfig::default(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            classify: default_classify_prompt(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            allow_folder_pick: true,
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::SortwiseError::Config(format!("Failed to parse config: {}", e)))?;
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

    /// Check values that parse fine but cannot work
    pub fn validate(&self) -> crate::Result<()> {
        if self.ai_engine.model.trim().is_empty() {
            return Err(crate::SortwiseError::Config("ai_engine.model is empty".to_string()));
        }
        if !self.ai_engine.url.starts_with("http://") && !self.ai_engine.url.starts_with("https://") {
            return Err(crate::SortwiseError::Config(format!(
                "ai_engine.url must be an http(s) URL, got '{}'",
                self.ai_engine.url
            )));
        }
        if !self.prompts.classify.contains(FILE_NAME_PLACEHOLDER) {
            return Err(crate::SortwiseError::Config(format!(
                "prompts.classify must contain {}",
                FILE_NAME_PLACEHOLDER
            )));
        }
        if self.web.max_upload_bytes == 0 {
            return Err(crate::SortwiseError::Config("web.max_upload_bytes must be positive".to_string()));
        }
        Ok(())
    }
}
