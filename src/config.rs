//! Configuration management for the `TripAI` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripAiError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `TripAI` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripAiConfig {
    /// Recommendation service configuration
    pub planner: PlannerConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Which planner implementation the session talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlannerBackend {
    /// REST proxy exposing `/recommend/destinations` and `/recommend/itinerary`
    Rest,
    /// OpenAI-compatible chat completions endpoint called directly
    Llm,
}

impl std::fmt::Display for PlannerBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlannerBackend::Rest => f.write_str("rest"),
            PlannerBackend::Llm => f.write_str("llm"),
        }
    }
}

/// Recommendation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub backend: PlannerBackend,
    /// Base URL of the REST proxy
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    pub llm: LlmConfig,
    pub images: ImageConfig,
}

/// Generative model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the chat completions API
    pub base_url: String,
    /// API key (falls back to `OPENAI_API_KEY`)
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// Language the planner writes its answers in
    pub language: String,
    /// Number of destinations asked for per query
    pub recommendation_count: u32,
}

/// Destination image lookup settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Unsplash access key (falls back to `UNSPLASH_ACCESS_KEY`)
    pub unsplash_access_key: Option<String>,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    /// Port of the session API
    pub port: u16,
    /// Port of the planner proxy
    pub proxy_port: u16,
    /// Directory with a built front-end to serve as fallback
    pub static_dir: Option<String>,
    /// Origins allowed by CORS
    pub allowed_origins: Vec<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_planner_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_planner_timeout() -> u32 {
    60
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}

fn default_llm_temperature() -> f32 {
    0.7
}

fn default_llm_language() -> String {
    "Korean".to_string()
}

fn default_recommendation_count() -> u32 {
    3
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_proxy_port() -> u16 {
    8000
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://localhost:3000".to_string(),
    ]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            backend: PlannerBackend::Rest,
            base_url: default_planner_base_url(),
            timeout_seconds: default_planner_timeout(),
            llm: LlmConfig::default(),
            images: ImageConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: None,
            model: default_llm_model(),
            temperature: default_llm_temperature(),
            language: default_llm_language(),
            recommendation_count: default_recommendation_count(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            proxy_port: default_proxy_port(),
            static_dir: None,
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TripAiConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TRIPAI_PLANNER__BACKEND=llm
        builder = builder.add_source(
            Environment::with_prefix("TRIPAI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripAiConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_env_keys();
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripai").join("config.toml"))
    }

    /// Fill missing credentials from the conventional provider variables
    pub fn apply_env_keys(&mut self) {
        if self.planner.llm.api_key.is_none() {
            self.planner.llm.api_key = std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty());
        }
        if self.planner.images.unsplash_access_key.is_none() {
            self.planner.images.unsplash_access_key = std::env::var("UNSPLASH_ACCESS_KEY")
                .ok()
                .filter(|k| !k.is_empty());
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.planner.base_url.is_empty() {
            self.planner.base_url = default_planner_base_url();
        }
        if self.planner.timeout_seconds == 0 {
            self.planner.timeout_seconds = default_planner_timeout();
        }
        if self.planner.llm.base_url.is_empty() {
            self.planner.llm.base_url = default_llm_base_url();
        }
        if self.planner.llm.model.is_empty() {
            self.planner.llm.model = default_llm_model();
        }
        if self.planner.llm.language.is_empty() {
            self.planner.llm.language = default_llm_language();
        }
        if self.planner.llm.recommendation_count == 0 {
            self.planner.llm.recommendation_count = default_recommendation_count();
        }
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_keys()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate API keys and credentials
    pub fn validate_api_keys(&self) -> Result<()> {
        match &self.planner.llm.api_key {
            Some(api_key) if api_key.trim().is_empty() => {
                return Err(TripAiError::config(
                    "LLM API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }
            None if self.planner.backend == PlannerBackend::Llm => {
                return Err(TripAiError::config(
                    "The llm planner backend needs an API key (planner.llm.api_key or OPENAI_API_KEY).",
                )
                .into());
            }
            _ => {}
        }

        if let Some(key) = &self.planner.images.unsplash_access_key {
            if key.trim().is_empty() {
                return Err(TripAiError::config(
                    "Unsplash access key cannot be empty if provided.",
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.planner.timeout_seconds > 300 {
            return Err(TripAiError::config("Planner timeout cannot exceed 300 seconds").into());
        }

        if !(0.0..=2.0).contains(&self.planner.llm.temperature) {
            return Err(TripAiError::config("LLM temperature must be between 0.0 and 2.0").into());
        }

        if self.planner.llm.recommendation_count > 10 {
            return Err(
                TripAiError::config("Recommendation count cannot exceed 10").into(),
            );
        }

        if self.server.port == 0 || self.server.proxy_port == 0 {
            return Err(TripAiError::config("Server ports must be non-zero").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripAiError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripAiError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Planner base URL", &self.planner.base_url),
            ("LLM base URL", &self.planner.llm.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripAiError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TripAiConfig::default();
        assert_eq!(config.planner.backend, PlannerBackend::Rest);
        assert_eq!(config.planner.base_url, "http://localhost:8000");
        assert_eq!(config.planner.timeout_seconds, 60);
        assert_eq!(config.planner.llm.model, "gpt-4o");
        assert_eq!(config.planner.llm.recommendation_count, 3);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.logging.level, "info");
        assert!(config.planner.llm.api_key.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(TripAiConfig::default().validate().is_ok());
    }

    #[test]
    fn test_llm_backend_requires_api_key() {
        let mut config = TripAiConfig::default();
        config.planner.backend = PlannerBackend::Llm;
        let result = config.validate_api_keys();
        assert!(result.is_err());

        config.planner.llm.api_key = Some("sk-test-key".to_string());
        assert!(config.validate_api_keys().is_ok());
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut config = TripAiConfig::default();
        config.planner.llm.api_key = Some("  ".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TripAiConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TripAiConfig::default();
        config.planner.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = TripAiConfig::default();
        config.planner.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_url_scheme() {
        let mut config = TripAiConfig::default();
        config.planner.base_url = "localhost:8000".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Planner base URL"));
    }

    #[test]
    fn test_apply_defaults_fills_blanks() {
        let mut config = TripAiConfig::default();
        config.planner.base_url = String::new();
        config.planner.llm.recommendation_count = 0;
        config.logging.format = String::new();
        config.apply_defaults();
        assert_eq!(config.planner.base_url, "http://localhost:8000");
        assert_eq!(config.planner.llm.recommendation_count, 3);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"[planner]
base_url = "http://planner.internal:9000"
timeout_seconds = 20

[planner.llm]
language = "English"

[server]
port = 8080"#
        )
        .unwrap();

        let config = TripAiConfig::load_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.planner.base_url, "http://planner.internal:9000");
        assert_eq!(config.planner.timeout_seconds, 20);
        assert_eq!(config.planner.llm.language, "English");
        assert_eq!(config.planner.llm.model, "gpt-4o");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = TripAiConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("tripai"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
