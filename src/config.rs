//! Configuration management for the travel guide service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TravelGuideError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable holding the Gaode map credential
pub const GAODE_API_KEY_VAR: &str = "GAODE_API_KEY";
/// Environment variable holding the DeepSeek model credential
pub const DEEPSEEK_API_KEY_VAR: &str = "DEEPSEEK_API_KEY";

/// Root configuration structure for the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Spot reference data location
    pub data: DataConfig,
    /// Gaode map settings
    pub map: MapConfig,
    /// Language model API settings
    pub model: ModelConfig,
    /// Context search settings
    pub search: SearchConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served under `/static`
    pub static_dir: String,
    /// Directory served under `/templates`, holding `index.html`
    pub templates_dir: String,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

/// Spot data files, one per category, relative to `dir`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub dir: String,
    pub scenic_file: String,
    pub romantic_file: String,
    pub family_file: String,
}

/// Gaode map settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Map API key (falls back to `GAODE_API_KEY`)
    pub api_key: Option<String>,
    /// Base URL of the map search deep link
    pub link_base_url: String,
    /// Base URL of the Gaode REST API
    pub rest_base_url: String,
    /// City assumed when none can be extracted from a question
    pub default_city: String,
    /// REST request timeout in seconds
    pub timeout_seconds: u32,
}

/// Language model API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Model API key (falls back to `DEEPSEEK_API_KEY`)
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    /// Upper bound on waiting for a model answer
    pub timeout_seconds: u32,
}

/// Context search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of related spots sent to the model
    pub limit: usize,
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
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_link_base_url() -> String {
    crate::map_link::DEFAULT_LINK_BASE_URL.to_string()
}

fn default_rest_base_url() -> String {
    "https://restapi.amap.com/v3".to_string()
}

fn default_city() -> String {
    "烟台".to_string()
}

fn default_map_timeout() -> u32 {
    10
}

fn default_model_base_url() -> String {
    "https://api.deepseek.com/v1".to_string()
}

fn default_model_name() -> String {
    "deepseek-reasoner".to_string()
}

fn default_model_timeout() -> u32 {
    120
}

fn default_search_limit() -> usize {
    crate::catalog::DEFAULT_SEARCH_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            templates_dir: default_templates_dir(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// Address the HTTP server binds to
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
            scenic_file: "scenic_spots.json".to_string(),
            romantic_file: "romantic_spots.json".to_string(),
            family_file: "family_attractions.json".to_string(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            link_base_url: default_link_base_url(),
            rest_base_url: default_rest_base_url(),
            default_city: default_city(),
            timeout_seconds: default_map_timeout(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_model_base_url(),
            model: default_model_name(),
            timeout_seconds: default_model_timeout(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_search_limit(),
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

impl AppConfig {
    /// Load configuration from specified path, or `config.toml` when absent,
    /// then environment variables.
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| PathBuf::from("config.toml"));
        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TRAVELGUIDE__SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("TRAVELGUIDE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AppConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.resolve_credentials(|name| std::env::var(name).ok());
        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Fill missing credentials from the conventional environment variables
    pub fn resolve_credentials<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.map.api_key.is_none() {
            self.map.api_key = lookup(GAODE_API_KEY_VAR);
        }
        if self.model.api_key.is_none() {
            self.model.api_key = lookup(DEEPSEEK_API_KEY_VAR);
        }
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.max_body_bytes == 0 {
            self.server.max_body_bytes = default_max_body_bytes();
        }
        if self.data.dir.is_empty() {
            self.data.dir = default_data_dir();
        }
        if self.map.link_base_url.is_empty() {
            self.map.link_base_url = default_link_base_url();
        }
        if self.map.rest_base_url.is_empty() {
            self.map.rest_base_url = default_rest_base_url();
        }
        if self.map.default_city.is_empty() {
            self.map.default_city = default_city();
        }
        if self.map.timeout_seconds == 0 {
            self.map.timeout_seconds = default_map_timeout();
        }
        if self.model.base_url.is_empty() {
            self.model.base_url = default_model_base_url();
        }
        if self.model.model.is_empty() {
            self.model.model = default_model_name();
        }
        if self.model.timeout_seconds == 0 {
            self.model.timeout_seconds = default_model_timeout();
        }
        if self.search.limit == 0 {
            self.search.limit = default_search_limit();
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

    /// Both credentials are required before serving
    pub fn validate_api_keys(&self) -> Result<()> {
        let present = |key: &Option<String>| key.as_deref().is_some_and(|k| !k.trim().is_empty());

        if !present(&self.map.api_key) {
            return Err(TravelGuideError::config(format!(
                "{GAODE_API_KEY_VAR} is not set. Set it in the environment or as map.api_key."
            ))
            .into());
        }

        if !present(&self.model.api_key) {
            return Err(TravelGuideError::config(format!(
                "{DEEPSEEK_API_KEY_VAR} is not set. Set it in the environment or as model.api_key."
            ))
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(TravelGuideError::config("Server port cannot be 0").into());
        }

        if self.model.timeout_seconds > 600 {
            return Err(
                TravelGuideError::config("Model API timeout cannot exceed 600 seconds").into(),
            );
        }

        if self.map.timeout_seconds > 120 {
            return Err(
                TravelGuideError::config("Map API timeout cannot exceed 120 seconds").into(),
            );
        }

        if !(1..=50).contains(&self.search.limit) {
            return Err(TravelGuideError::config("Search limit must be between 1 and 50").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelGuideError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelGuideError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Model API base URL", &self.model.base_url),
            ("Map link base URL", &self.map.link_base_url),
            ("Map REST base URL", &self.map.rest_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TravelGuideError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
