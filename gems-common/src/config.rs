//! Configuration management for the screener.
//!
//! The screener reads a single configuration file at `~/.gems/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (GEMS_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `GEMS_LOG_LEVEL` → observability.log_level
//! - `GEMS_LOG_FORMAT` → observability.log_format
//! - `GEMS_DATA_DIR` → data.snapshot_dir (also switches data.provider to "snapshot")
//! - `GEMS_REPORT_DIR` → output.report_dir
//! - `GEMS_CONCURRENCY` → data.concurrency

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ResultExt};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".gems"),
        |dirs| dirs.home_dir().join(".gems"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Expand `~` and environment variables in a configured path.
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::full(raw).map_or_else(|_| raw.to_string(), |p| p.into_owned()))
}

// ============================================================================
// Observability
// ============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Data Source
// ============================================================================

/// Market data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceConfig {
    /// Provider kind: "yahoo" (HTTP) or "snapshot" (JSON files on disk)
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Directory holding `<TICKER>.json` snapshot records
    #[serde(default)]
    pub snapshot_dir: Option<String>,

    /// Requests per minute allowed against the HTTP provider
    #[serde(default = "default_rate_limit_rpm")]
    pub rate_limit_rpm: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tickers fetched and scored concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            snapshot_dir: None,
            rate_limit_rpm: default_rate_limit_rpm(),
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_provider() -> String {
    "yahoo".into()
}

fn default_rate_limit_rpm() -> u32 {
    120
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_concurrency() -> usize {
    4
}

// ============================================================================
// Output
// ============================================================================

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory where reports are written (`~` is expanded)
    #[serde(default = "default_report_dir")]
    pub report_dir: String,

    /// Write the deep-analysis JSON queue alongside the CSV
    #[serde(default = "default_true")]
    pub write_ai_queue: bool,

    /// Write a Markdown summary alongside the CSV
    #[serde(default = "default_true")]
    pub write_markdown: bool,

    /// Number of top-ranked stocks shown in the summary
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
            write_ai_queue: true,
            write_markdown: true,
            top_n: default_top_n(),
        }
    }
}

impl OutputConfig {
    /// Report directory with `~` expanded.
    pub fn report_path(&self) -> PathBuf {
        expand_path(&self.report_dir)
    }
}

fn default_report_dir() -> String {
    "~/.gems/reports".into()
}

fn default_top_n() -> usize {
    20
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Screener Overrides
// ============================================================================

/// Optional overrides for the built-in scan policy.
///
/// Any field left unset keeps the screener's default for the selected market.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenerOverrides {
    /// Default market when none is given on the command line (US, INDIA, BOTH)
    #[serde(default)]
    pub market: Option<String>,

    /// Points added to the STRONG_BUY/BUY valuation bars in a bearish regime
    #[serde(default)]
    pub bearish_adjustment: Option<f64>,

    /// Hold cash instead of issuing buy-class signals in a bearish regime
    #[serde(default)]
    pub block_buys_in_bear: Option<bool>,

    /// Composite weight of the enhanced valuation score
    #[serde(default)]
    pub valuation_weight: Option<f64>,

    /// Composite weight of the technical score
    #[serde(default)]
    pub technical_weight: Option<f64>,

    /// Sector P/E used when a sector has no override
    #[serde(default)]
    pub default_sector_pe: Option<f64>,

    /// Sector name → average P/E
    #[serde(default)]
    pub sector_pe: HashMap<String, f64>,

    /// Factor applied to YoY EPS growth to approximate the 3-year figure
    #[serde(default)]
    pub eps_3y_proxy_factor: Option<f64>,

    /// Replace the built-in universe with this ticker list
    #[serde(default)]
    pub universe: Option<Vec<String>>,
}

// ============================================================================
// Root
// ============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Market data source
    #[serde(default)]
    pub data: DataSourceConfig,

    /// Report output
    #[serde(default)]
    pub output: OutputConfig,

    /// Scan policy overrides
    #[serde(default)]
    pub screener: ScreenerOverrides,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .context(format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides applied.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("GEMS_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("GEMS_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Ok(dir) = std::env::var("GEMS_DATA_DIR") {
            self.use_snapshot_dir(dir);
        }
        if let Ok(dir) = std::env::var("GEMS_REPORT_DIR") {
            self.output.report_dir = dir;
        }
        if let Ok(n) = std::env::var("GEMS_CONCURRENCY") {
            if let Ok(n) = n.parse() {
                self.data.concurrency = n;
            }
        }
    }

    /// Point the data source at a snapshot directory.
    pub fn use_snapshot_dir(&mut self, dir: impl Into<String>) {
        self.data.provider = "snapshot".into();
        self.data.snapshot_dir = Some(dir.into());
    }

    /// Save configuration to a path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.observability.log_format, "pretty");
        assert_eq!(config.data.provider, "yahoo");
        assert_eq!(config.data.concurrency, 4);
        assert_eq!(config.output.top_n, 20);
        assert!(config.output.write_ai_queue);
        assert!(config.screener.market.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "observability": { "level": "debug" },
            "screener": { "bearish_adjustment": 5, "sector_pe": { "Technology": 32.5 } }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.observability.log_format, "pretty");
        assert_eq!(config.screener.bearish_adjustment, Some(5.0));
        assert_eq!(config.screener.sector_pe.get("Technology"), Some(&32.5));
        assert_eq!(config.data.timeout_secs, 30);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.use_snapshot_dir("/tmp/snapshots");
        config.output.top_n = 5;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.data.provider, "snapshot");
        assert_eq!(loaded.data.snapshot_dir.as_deref(), Some("/tmp/snapshots"));
        assert_eq!(loaded.output.top_n, 5);
    }

    #[test]
    fn test_load_from_invalid_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
        assert!(matches!(err, Error::WithContext { ref source, .. } if matches!(**source, Error::Json(_))));
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.json")).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read config"));
        assert!(matches!(err, Error::WithContext { ref source, .. } if matches!(**source, Error::Io(_))));
        assert!(!err.is_config());
    }

    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("/var/reports"), PathBuf::from("/var/reports"));
    }

    #[test]
    fn test_config_dir_ends_with_gems() {
        assert!(config_dir().ends_with(".gems"));
        assert!(config_path().ends_with(".gems/config.json"));
    }
}
