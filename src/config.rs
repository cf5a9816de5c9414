//! Configuration management for wingcast
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings. The loaded
//! configuration is an immutable input for the duration of a request.

use crate::WingcastError;
use crate::models::{Location, RiderProfile, SkillLevel};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WingcastConfig {
    /// Spot being forecast
    #[serde(default)]
    pub location: LocationConfig,
    /// Scoring thresholds
    #[serde(default)]
    pub wingfoil_preferences: WingfoilPreferences,
    /// Forecast model identifiers queried for the consensus
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    /// Operator-supplied weight per model (missing models weigh 1.0)
    #[serde(default)]
    pub model_weights: HashMap<String, f64>,
    /// Rider profile used for equipment advice
    #[serde(default)]
    pub user: UserConfig,
    /// Third-party credentials
    #[serde(default)]
    pub integrations: IntegrationsConfig,
    /// Provider endpoints, retry budgets and fetch concurrency
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP front door
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_location_name")]
    pub name: String,
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Bearing the shoreline faces, in degrees
    #[serde(default = "default_shore_bearing", alias = "shore_direction")]
    pub shore_bearing: f64,
}

/// Wind and wave thresholds for the suitability scorer, in knots and meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WingfoilPreferences {
    #[serde(default = "default_min_wind")]
    pub min_wind_knots: f64,
    #[serde(default = "default_max_wind")]
    pub max_wind_knots: f64,
    #[serde(default = "default_optimal_min")]
    pub optimal_wind_min: f64,
    #[serde(default = "default_optimal_max")]
    pub optimal_wind_max: f64,
    #[serde(default = "default_max_wave")]
    pub max_wave_height: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_rider_weight")]
    pub rider_weight_kg: f64,
    #[serde(default)]
    pub skill_level: SkillLevel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationsConfig {
    /// Key for the OpenWeather cross-check provider; cross-checking is skipped without it
    #[serde(default, alias = "secondary_api_key")]
    pub openweather_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_forecast_base_url")]
    pub forecast_base_url: String,
    #[serde(default = "default_marine_base_url")]
    pub marine_base_url: String,
    #[serde(default = "default_openweather_base_url")]
    pub openweather_base_url: String,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// Extra attempts for the standard and marine providers
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_cross_check_max_retries")]
    pub cross_check_max_retries: u32,
    #[serde(default)]
    pub model_max_retries: u32,
    /// Base of the exponential backoff; attempt n waits `base * 2^n`
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_models() -> Vec<String> {
    vec![
        "gfs_seamless".to_string(),
        "icon_seamless".to_string(),
        "ecmwf_ifs04".to_string(),
    ]
}

fn default_location_name() -> String {
    "Default Location".to_string()
}

fn default_latitude() -> f64 {
    52.52
}

fn default_longitude() -> f64 {
    13.405
}

fn default_shore_bearing() -> f64 {
    180.0
}

fn default_min_wind() -> f64 {
    8.0
}

fn default_max_wind() -> f64 {
    35.0
}

fn default_optimal_min() -> f64 {
    12.0
}

fn default_optimal_max() -> f64 {
    22.0
}

fn default_max_wave() -> f64 {
    2.0
}

fn default_rider_weight() -> f64 {
    80.0
}

fn default_forecast_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_marine_base_url() -> String {
    "https://marine-api.open-meteo.com/v1".to_string()
}

fn default_openweather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_forecast_days() -> u32 {
    3
}

fn default_max_retries() -> u32 {
    2
}

fn default_cross_check_max_retries() -> u32 {
    1
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_max_concurrent_fetches() -> usize {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            name: default_location_name(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            shore_bearing: default_shore_bearing(),
        }
    }
}

impl Default for WingfoilPreferences {
    fn default() -> Self {
        Self {
            min_wind_knots: default_min_wind(),
            max_wind_knots: default_max_wind(),
            optimal_wind_min: default_optimal_min(),
            optimal_wind_max: default_optimal_max(),
            max_wave_height: default_max_wave(),
        }
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            rider_weight_kg: default_rider_weight(),
            skill_level: SkillLevel::default(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            forecast_base_url: default_forecast_base_url(),
            marine_base_url: default_marine_base_url(),
            openweather_base_url: default_openweather_base_url(),
            forecast_days: default_forecast_days(),
            max_retries: default_max_retries(),
            cross_check_max_retries: default_cross_check_max_retries(),
            model_max_retries: 0,
            backoff_base_ms: default_backoff_base_ms(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for WingcastConfig {
    fn default() -> Self {
        Self {
            location: LocationConfig::default(),
            wingfoil_preferences: WingfoilPreferences::default(),
            models: default_models(),
            model_weights: HashMap::new(),
            user: UserConfig::default(),
            integrations: IntegrationsConfig::default(),
            providers: ProvidersConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl WingcastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // An explicitly named file must be readable; the default one is optional
        if let Some(path) = &config_path {
            std::fs::metadata(path)
                .map_err(WingcastError::from)
                .with_context(|| format!("Cannot read config file {}", path.display()))?;
        }

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        // Format follows the extension, so both config.toml and config.json work
        if config_file.exists() {
            builder = builder.add_source(File::from(config_file.clone()).required(false));
        }

        // Environment overrides, e.g. WINGCAST_LOCATION__LATITUDE=36.01
        builder = builder.add_source(
            Environment::with_prefix("WINGCAST")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("models")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: WingcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wingcast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.location.name.trim().is_empty() {
            self.location.name = default_location_name();
        }
        if self.models.is_empty() {
            self.models = default_models();
        }
        if self.providers.forecast_base_url.is_empty() {
            self.providers.forecast_base_url = default_forecast_base_url();
        }
        if self.providers.marine_base_url.is_empty() {
            self.providers.marine_base_url = default_marine_base_url();
        }
        if self.providers.openweather_base_url.is_empty() {
            self.providers.openweather_base_url = default_openweather_base_url();
        }
        if self.providers.forecast_days == 0 {
            self.providers.forecast_days = default_forecast_days();
        }
        if self.providers.max_concurrent_fetches == 0 {
            self.providers.max_concurrent_fetches = default_max_concurrent_fetches();
        }
        if self
            .integrations
            .openweather_api_key
            .as_deref()
            .is_some_and(|key| key.trim().is_empty())
        {
            self.integrations.openweather_api_key = None;
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
        self.validate_location()?;
        self.validate_preferences()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_location(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.location.latitude) {
            return Err(WingcastError::config(format!(
                "Latitude must be between -90 and 90, got: {}",
                self.location.latitude
            ))
            .into());
        }

        if !(-180.0..=180.0).contains(&self.location.longitude) {
            return Err(WingcastError::config(format!(
                "Longitude must be between -180 and 180, got: {}",
                self.location.longitude
            ))
            .into());
        }

        if !(0.0..=360.0).contains(&self.location.shore_bearing) {
            return Err(WingcastError::config(format!(
                "Shore bearing must be between 0 and 360 degrees, got: {}",
                self.location.shore_bearing
            ))
            .into());
        }

        Ok(())
    }

    /// Thresholds must be ordered min < optimal_min <= optimal_max < max
    fn validate_preferences(&self) -> Result<()> {
        let p = &self.wingfoil_preferences;
        let ordered = p.min_wind_knots >= 0.0
            && p.min_wind_knots < p.optimal_wind_min
            && p.optimal_wind_min <= p.optimal_wind_max
            && p.optimal_wind_max < p.max_wind_knots;

        if !ordered {
            return Err(WingcastError::config(format!(
                "Wind thresholds must satisfy min < optimal_min <= optimal_max < max, got {}/{}/{}/{}",
                p.min_wind_knots, p.optimal_wind_min, p.optimal_wind_max, p.max_wind_knots
            ))
            .into());
        }

        if p.max_wave_height <= 0.0 {
            return Err(WingcastError::config("Maximum wave height must be positive").into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.providers.max_retries > 10
            || self.providers.cross_check_max_retries > 10
            || self.providers.model_max_retries > 10
        {
            return Err(WingcastError::config("Provider max retries cannot exceed 10").into());
        }

        if self.providers.forecast_days > 16 {
            return Err(WingcastError::config("Forecast days cannot exceed 16").into());
        }

        if self.providers.max_concurrent_fetches > 32 {
            return Err(
                WingcastError::config("Concurrent provider fetches cannot exceed 32").into(),
            );
        }

        if !(20.0..=200.0).contains(&self.user.rider_weight_kg) {
            return Err(WingcastError::config(format!(
                "Rider weight must be between 20 and 200 kg, got: {}",
                self.user.rider_weight_kg
            ))
            .into());
        }

        if let Some((model, weight)) = self
            .model_weights
            .iter()
            .find(|(_, w)| !w.is_finite() || **w < 0.0)
        {
            return Err(WingcastError::config(format!(
                "Model weight for '{model}' must be a finite, non-negative number, got: {weight}"
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(WingcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(WingcastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let urls = [
            &self.providers.forecast_base_url,
            &self.providers.marine_base_url,
            &self.providers.openweather_base_url,
        ];
        if let Some(bad) = urls
            .iter()
            .find(|url| !url.starts_with("http://") && !url.starts_with("https://"))
        {
            return Err(WingcastError::config(format!(
                "Provider base URL must be a valid HTTP or HTTPS URL, got: {bad}"
            ))
            .into());
        }

        Ok(())
    }

    /// Copy of the configuration that is safe to log
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut safe = self.clone();
        if safe.integrations.openweather_api_key.is_some() {
            safe.integrations.openweather_api_key = Some("REDACTED".to_string());
        }
        safe
    }

    /// The configured spot as a domain location
    #[must_use]
    pub fn spot(&self) -> Location {
        Location::new(
            self.location.name.clone(),
            self.location.latitude,
            self.location.longitude,
            self.location.shore_bearing,
        )
    }

    #[must_use]
    pub fn rider(&self) -> RiderProfile {
        RiderProfile {
            weight_kg: self.user.rider_weight_kg,
            skill: self.user.skill_level,
        }
    }

    /// Configured weight of a model, 1.0 when not configured
    #[must_use]
    pub fn model_weight(&self, model: &str) -> f64 {
        self.model_weights.get(model).copied().unwrap_or(1.0)
    }
}
