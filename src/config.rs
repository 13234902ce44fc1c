//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::controller::LiveSettings;
use crate::model::{Thresholds, DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD};
use crate::source::HttpSourceConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub live: LiveConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Occupancy backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout; a hung request must not outlive a poll period
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30_000 // one fast poll period
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn source_config(&self) -> HttpSourceConfig {
        HttpSourceConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
        }
    }
}

/// Live view polling and badge thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,

    /// Trend chart refreshes every `refresh_interval_ms * trend_interval_multiplier`
    #[serde(default = "default_trend_multiplier")]
    pub trend_interval_multiplier: u32,

    #[serde(default = "default_low_threshold")]
    pub low_threshold: u64,

    #[serde(default = "default_high_threshold")]
    pub high_threshold: u64,
}

fn default_refresh_interval() -> u64 {
    30_000
}

fn default_trend_multiplier() -> u32 {
    2
}

fn default_low_threshold() -> u64 {
    DEFAULT_LOW_THRESHOLD
}

fn default_high_threshold() -> u64 {
    DEFAULT_HIGH_THRESHOLD
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval(),
            trend_interval_multiplier: default_trend_multiplier(),
            low_threshold: default_low_threshold(),
            high_threshold: default_high_threshold(),
        }
    }
}

impl LiveConfig {
    pub fn settings(&self) -> LiveSettings {
        LiveSettings {
            refresh_interval: Duration::from_millis(self.refresh_interval_ms),
            trend_multiplier: self.trend_interval_multiplier,
            thresholds: Thresholds::new(self.low_threshold, self.high_threshold),
        }
    }
}

/// Chart geometry and SVG output location
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    #[serde(default = "default_chart_width")]
    pub width: u32,

    #[serde(default = "default_chart_height")]
    pub height: u32,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_chart_width() -> u32 {
    800
}

fn default_chart_height() -> u32 {
    400
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_chart_width(),
            height: default_chart_height(),
            output_dir: default_output_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// The result is not validated; callers validate once overrides are in.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_overrides(path, |key| std::env::var(key).ok())
    }

    fn load_with_overrides(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("occupancy-dashboard").join("config.toml")),
            Some(PathBuf::from("/etc/occupancy-dashboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Reject settings the dashboard cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.live.low_threshold > self.live.high_threshold {
            return Err(ConfigError::Invalid(format!(
                "low_threshold ({}) is above high_threshold ({})",
                self.live.low_threshold, self.live.high_threshold
            )));
        }
        if self.backend.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_ms must be positive".to_string(),
            ));
        }
        if self.live.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_ms must be positive".to_string(),
            ));
        }
        if self.live.trend_interval_multiplier == 0 {
            return Err(ConfigError::Invalid(
                "trend_interval_multiplier must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `OCCUPANCY_*` overrides read through `lookup`. Unparsable
    /// numbers are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Backend overrides
        if let Some(url) = lookup("OCCUPANCY_BASE_URL") {
            self.backend.base_url = url;
        }
        if let Some(timeout) = lookup("OCCUPANCY_REQUEST_TIMEOUT_MS") {
            if let Ok(t) = timeout.parse() {
                self.backend.request_timeout_ms = t;
            }
        }

        // Live overrides
        if let Some(interval) = lookup("OCCUPANCY_REFRESH_INTERVAL_MS") {
            if let Ok(i) = interval.parse() {
                self.live.refresh_interval_ms = i;
            }
        }
        if let Some(low) = lookup("OCCUPANCY_LOW_THRESHOLD") {
            if let Ok(l) = low.parse() {
                self.live.low_threshold = l;
            }
        }
        if let Some(high) = lookup("OCCUPANCY_HIGH_THRESHOLD") {
            if let Ok(h) = high.parse() {
                self.live.high_threshold = h;
            }
        }

        // Chart overrides
        if let Some(dir) = lookup("OCCUPANCY_CHART_DIR") {
            self.chart.output_dir = PathBuf::from(dir);
        }

        // Logging overrides
        if let Some(level) = lookup("OCCUPANCY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("OCCUPANCY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Occupancy Dashboard Configuration
#
# Environment variables override these settings:
# - OCCUPANCY_BASE_URL
# - OCCUPANCY_REQUEST_TIMEOUT_MS
# - OCCUPANCY_REFRESH_INTERVAL_MS
# - OCCUPANCY_LOW_THRESHOLD
# - OCCUPANCY_HIGH_THRESHOLD
# - OCCUPANCY_CHART_DIR
# - OCCUPANCY_LOG_LEVEL
# - OCCUPANCY_LOG_FORMAT

[backend]
# Occupancy backend serving /current, /stats and /stats/history
base_url = "http://localhost:8000"

# Per-request timeout (ms)
request_timeout_ms = 30000

[live]
# How often the live counter refreshes (ms)
refresh_interval_ms = 30000

# The trend chart refreshes every refresh_interval_ms * this
trend_interval_multiplier = 2

# Badge thresholds: count < low is available, count >= high is full
low_threshold = 30
high_threshold = 40

[chart]
# Chart size in pixels
width = 800
height = 400

# Where --svg writes live.svg and history.svg
output_dir = "."

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/occupancy-dashboard.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_generated_config_matches_defaults() {
        let file = write_config(&generate_default_config());
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.request_timeout_ms, 30_000);
        assert_eq!(config.live.refresh_interval_ms, 30_000);
        assert_eq!(config.live.trend_interval_multiplier, 2);
        assert_eq!(config.live.low_threshold, 30);
        assert_eq!(config.live.high_threshold, 40);
        assert_eq!(config.chart.width, 800);
        assert_eq!(config.chart.output_dir, PathBuf::from("."));
        assert_eq!(config.logging.format, "pretty");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
[backend]
base_url = "http://sensors.local:9000"

[live]
high_threshold = 55
"#,
        );
        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.backend.base_url, "http://sensors.local:9000");
        assert_eq!(config.backend.request_timeout_ms, 30_000);
        assert_eq!(config.live.low_threshold, 30);
        assert_eq!(config.live.high_threshold, 55);
    }

    #[test]
    fn test_live_settings() {
        let live = LiveConfig {
            refresh_interval_ms: 10_000,
            trend_interval_multiplier: 3,
            low_threshold: 5,
            high_threshold: 8,
        };
        let settings = live.settings();

        assert_eq!(settings.refresh_interval, Duration::from_secs(10));
        assert_eq!(settings.trend_interval(), Duration::from_secs(30));
        assert_eq!(settings.thresholds, Thresholds::new(5, 8));
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let file = write_config("[live]\nlow_threshold = 50\nhigh_threshold = 40\n");
        let config = Config::load(file.path()).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let err = Config::load_with_overrides(file.path(), |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_overrides_applied_before_validation() {
        let file = write_config("[live]\nlow_threshold = 50\nhigh_threshold = 40\n");
        let config = Config::load_with_overrides(file.path(), |key| match key {
            "OCCUPANCY_HIGH_THRESHOLD" => Some("60".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.live.low_threshold, 50);
        assert_eq!(config.live.high_threshold, 60);

        // An override can also break a valid file
        let file = write_config("[backend]\nrequest_timeout_ms = 1000\n");
        let err = Config::load_with_overrides(file.path(), |key| match key {
            "OCCUPANCY_REQUEST_TIMEOUT_MS" => Some("0".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let mut config = Config::default();
        config.backend.request_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.live.refresh_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.live.trend_interval_multiplier = 0;
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_missing_and_malformed_files() {
        let err = Config::load(Path::new("/nonexistent/occupancy.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let file = write_config("[backend\nbase_url = ");
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OCCUPANCY_BASE_URL", "http://10.0.0.7:8000"),
            ("OCCUPANCY_REFRESH_INTERVAL_MS", "5000"),
            ("OCCUPANCY_HIGH_THRESHOLD", "not-a-number"),
            ("OCCUPANCY_CHART_DIR", "/tmp/charts"),
            ("OCCUPANCY_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "http://10.0.0.7:8000");
        assert_eq!(config.live.refresh_interval_ms, 5000);
        assert_eq!(config.live.high_threshold, 40);
        assert_eq!(config.chart.output_dir, PathBuf::from("/tmp/charts"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }
}
