//! Configuration management for `tripcast`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TripError;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripcastConfig {
    /// Planner backend endpoints
    #[serde(default)]
    pub backend: BackendConfig,
    /// Map and list presentation
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Planner backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the directions proxy (`/google_directions`)
    #[serde(default = "default_backend_url")]
    pub directions_base_url: String,
    /// Base URL of the transit planner (`/plan_transit_full`)
    #[serde(default = "default_backend_url")]
    pub transit_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_seconds: u32,
    /// Ask for alternative routes by default
    #[serde(default = "default_alternatives")]
    pub alternatives: bool,
}

/// Presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// IANA time zone used to group events by day
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Maximum number of lettered markers per route
    #[serde(default = "default_max_markers")]
    pub max_markers: usize,
    /// Fraction of the route span added around the viewport
    #[serde(default = "default_viewport_padding")]
    pub viewport_padding: f64,
    /// Derive alerts from the weather when the backend sends none
    #[serde(default)]
    pub derive_alerts: bool,
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

// Default value functions
fn default_backend_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_backend_timeout() -> u32 {
    30
}

fn default_alternatives() -> bool {
    true
}

fn default_time_zone() -> String {
    "America/Denver".to_string()
}

fn default_max_markers() -> usize {
    crate::markers::MAX_MARKERS
}

fn default_viewport_padding() -> f64 {
    0.1
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            directions_base_url: default_backend_url(),
            transit_base_url: default_backend_url(),
            timeout_seconds: default_backend_timeout(),
            alternatives: default_alternatives(),
        }
    }
}

impl BackendConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.timeout_seconds))
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            max_markers: default_max_markers(),
            viewport_padding: default_viewport_padding(),
            derive_alerts: false,
        }
    }
}

impl DisplayConfig {
    /// The configured time zone
    pub fn tz(&self) -> crate::Result<chrono_tz::Tz> {
        self.time_zone.parse::<chrono_tz::Tz>().map_err(|_| {
            TripError::config(format!("Unknown time zone '{}'", self.time_zone))
        })
    }

    /// Current time in the configured zone
    pub fn now(&self) -> crate::Result<DateTime<chrono_tz::Tz>> {
        Ok(Utc::now().with_timezone(&self.tz()?))
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

impl TripcastConfig {
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

        // Environment overrides, e.g. TRIPCAST_BACKEND__TIMEOUT_SECONDS=10
        builder = builder.add_source(
            Environment::with_prefix("TRIPCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripcastConfig = settings
            .try_deserialize()
            .with_context(|| format!("Failed to deserialize configuration from {}", config_file.display()))?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripcast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.backend.directions_base_url.is_empty() {
            self.backend.directions_base_url = default_backend_url();
        }
        if self.backend.transit_base_url.is_empty() {
            self.backend.transit_base_url = default_backend_url();
        }
        if self.backend.timeout_seconds == 0 {
            self.backend.timeout_seconds = default_backend_timeout();
        }
        if self.display.time_zone.is_empty() {
            self.display.time_zone = default_time_zone();
        }
        if self.display.max_markers == 0 {
            self.display.max_markers = default_max_markers();
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
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.backend.timeout_seconds > 300 {
            return Err(TripError::config("Backend timeout cannot exceed 300 seconds").into());
        }

        if !(2..=crate::markers::MAX_MARKERS).contains(&self.display.max_markers) {
            return Err(TripError::config(format!(
                "Maximum markers must be between 2 and {}",
                crate::markers::MAX_MARKERS
            ))
            .into());
        }

        if !(0.0..=1.0).contains(&self.display.viewport_padding) {
            return Err(TripError::config("Viewport padding must be between 0.0 and 1.0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Directions", &self.backend.directions_base_url),
            ("Transit", &self.backend.transit_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TripError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        self.display.tz()?;

        Ok(())
    }
}
