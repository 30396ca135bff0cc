//! Configuration management for the travel planner service
//!
//! Handles loading configuration from an optional TOML file and environment
//! variables, and validates every setting before the server starts.

use crate::TravelPlannerError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variable carrying the model provider credential
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable pointing at an alternative config file
pub const CONFIG_PATH_ENV: &str = "TRAVEL_PLANNER_CONFIG";

/// Root configuration structure for the travel planner service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravelPlannerConfig {
    /// Language model configuration
    #[serde(default)]
    pub model: ModelConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Flight synthesis settings
    #[serde(default)]
    pub flights: FlightConfig,
}

/// Language model configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Gemini API key
    pub api_key: Option<String>,
    /// Model name, e.g. `gemini-2.0-flash`
    #[serde(default = "default_model_name")]
    pub model: String,
    /// Base URL of the Gemini REST API
    #[serde(default = "default_model_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_model_max_retries")]
    pub max_retries: u32,
}

/// HTTP server configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Directory with the static frontend served at `/`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Flight synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightConfig {
    /// Date used when the request's dates contain no `YYYY-MM-DD` literal
    #[serde(default = "default_flight_date")]
    pub default_date: String,
    /// Maximum number of flight options rendered
    #[serde(default = "default_max_options")]
    pub max_options: usize,
}

// Default value functions
fn default_model_name() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_model_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model_timeout() -> u32 {
    60
}

fn default_model_max_retries() -> u32 {
    3
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_static_dir() -> String {
    "frontend".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_flight_date() -> String {
    "2025-04-02".to_string()
}

fn default_max_options() -> usize {
    3
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model_name(),
            base_url: default_model_base_url(),
            timeout_seconds: default_model_timeout(),
            max_retries: default_model_max_retries(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            static_dir: default_static_dir(),
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

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            default_date: default_flight_date(),
            max_options: default_max_options(),
        }
    }
}

impl FlightConfig {
    /// Parsed fallback travel date. Only valid after [`TravelPlannerConfig::validate`].
    pub fn default_date(&self) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(&self.default_date, "%Y-%m-%d")
            .with_context(|| format!("Invalid default flight date '{}'", self.default_date))
    }
}

impl TravelPlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
    }

    /// Load configuration from specified path
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

        // TRAVEL_PLANNER__SERVER__PORT=8080 overrides server.port
        builder = builder.add_source(
            Environment::with_prefix("TRAVEL_PLANNER")
                .separator("__")
                .try_parsing(true),
        );

        builder = builder
            .set_override_option("model.api_key", env::var(API_KEY_ENV).ok())
            .with_context(|| "Failed to apply API key override")?;

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TravelPlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.model.model.is_empty() {
            self.model.model = default_model_name();
        }
        if self.model.base_url.is_empty() {
            self.model.base_url = default_model_base_url();
        }
        if self.model.timeout_seconds == 0 {
            self.model.timeout_seconds = default_model_timeout();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.flights.default_date.is_empty() {
            self.flights.default_date = default_flight_date();
        }
        if self.flights.max_options == 0 {
            self.flights.max_options = default_max_options();
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
        match &self.model.api_key {
            None => Err(TravelPlannerError::config(format!(
                "No Gemini API key found. Please set the {API_KEY_ENV} environment variable."
            ))
            .into()),
            Some(api_key) if api_key.trim().is_empty() => Err(TravelPlannerError::config(format!(
                "{API_KEY_ENV} is set but empty."
            ))
            .into()),
            Some(api_key) if api_key.len() < 8 => Err(TravelPlannerError::config(
                "Gemini API key appears to be invalid (too short). Please check your API key.",
            )
            .into()),
            Some(_) => Ok(()),
        }
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.model.timeout_seconds > 300 {
            return Err(
                TravelPlannerError::config("Model API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.model.max_retries > 10 {
            return Err(TravelPlannerError::config("Model API max retries cannot exceed 10").into());
        }

        if self.flights.max_options > 10 {
            return Err(
                TravelPlannerError::config("Flight max options cannot exceed 10").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TravelPlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TravelPlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.model.base_url.starts_with("http://") && !self.model.base_url.starts_with("https://")
        {
            return Err(TravelPlannerError::config(
                "Model API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if self.flights.default_date().is_err() {
            return Err(TravelPlannerError::config(format!(
                "Invalid default flight date '{}'. Expected YYYY-MM-DD",
                self.flights.default_date
            ))
            .into());
        }

        Ok(())
    }
}
