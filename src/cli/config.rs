//! Configuration management for llmstream
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.llmstream/config.toml

use crate::bedrock::{DEFAULT_MAX_TOKENS, DEFAULT_REGION};
use crate::errors::{LlmError, Result};
use crate::ollama::DEFAULT_MODEL as DEFAULT_OLLAMA_MODEL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Bedrock model
pub const DEFAULT_BEDROCK_MODEL: &str = "us.anthropic.claude-3-5-haiku-20241022-v1:0";

/// Complete configuration for llmstream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub bedrock: BedrockConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ollama connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub default_model: String,
}

/// Bedrock session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BedrockConfig {
    pub region: String,
    pub default_model: String,
    pub max_tokens: u32,
}

/// Log output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 11434,
            default_model: DEFAULT_OLLAMA_MODEL.to_string(),
        }
    }
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            default_model: DEFAULT_BEDROCK_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LlmError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate a TOML document
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)
            .map_err(|e| LlmError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// Standard configuration location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".llmstream").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.ollama.host.trim().is_empty() {
            return Err(LlmError::ConfigError("ollama.host must not be empty".to_string()));
        }

        if self.ollama.port == 0 {
            return Err(LlmError::ConfigError("ollama.port must be greater than 0".to_string()));
        }

        if self.bedrock.max_tokens == 0 {
            return Err(LlmError::ConfigError(
                "bedrock.max_tokens must be greater than 0".to_string(),
            ));
        }

        if self.ollama.default_model.trim().is_empty() || self.bedrock.default_model.trim().is_empty() {
            return Err(LlmError::ConfigError("default_model must not be empty".to_string()));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| LlmError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| LlmError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| LlmError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }
}
