//! Service configuration.
//!
//! Loaded from a TOML file (default `water_anomalies.toml`, or the path in
//! `WATER_ANOMALIES_CONFIG`). Every section is optional; a missing file means
//! built-in defaults. `WATER_ANOMALIES_REGIONS` (comma separated) overrides
//! the configured region list, and `--region` overrides both.
//!
//! ```toml
//! [query]
//! regions = ["tx", "ok"]
//! timeout_secs = 30
//!
//! [logging]
//! level = "info"
//! file = "anomalies.log"
//! timestamps = false
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::logging::LogLevel;
use crate::regions::{self, DEFAULT_REGIONS};

pub const DEFAULT_CONFIG_PATH: &str = "water_anomalies.toml";
pub const CONFIG_PATH_ENV: &str = "WATER_ANOMALIES_CONFIG";
pub const REGIONS_ENV: &str = "WATER_ANOMALIES_REGIONS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ---------------------------------------------------------------------------
// File structure
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    query: QuerySection,
    #[serde(default)]
    logging: LoggingSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct QuerySection {
    regions: Option<Vec<String>>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct LoggingSection {
    level: Option<String>,
    file: Option<String>,
    #[serde(default)]
    timestamps: bool,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved, validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Normalized region codes, in query order.
    pub regions: Vec<String>,
    pub timeout_secs: u64,
    pub log_level: LogLevel,
    pub log_file: Option<String>,
    pub console_timestamps: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regions: DEFAULT_REGIONS.iter().map(|c| c.to_string()).collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: LogLevel::Info,
            log_file: None,
            console_timestamps: false,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, message: String },
    Syntax { path: String, message: String },
    InvalidRegion(String),
    NoRegions,
    InvalidLogLevel(String),
    InvalidTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "Could not read config {}: {}", path, message)
            }
            ConfigError::Syntax { path, message } => {
                write!(f, "Invalid config {}: {}", path, message)
            }
            ConfigError::InvalidRegion(code) => write!(f, "Unknown region code: {}", code),
            ConfigError::NoRegions => write!(f, "No regions configured"),
            ConfigError::InvalidLogLevel(level) => write!(f, "Unknown log level: {}", level),
            ConfigError::InvalidTimeout => write!(f, "timeout_secs must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Loads configuration from `path`, or from the env/default path when
    /// `path` is `None`. An explicit path must exist; the default may not.
    ///
    /// Regions resolve file, then `WATER_ANOMALIES_REGIONS`, then
    /// `cli_regions`. A non-empty `cli_regions` wins outright and the
    /// environment value is never read.
    pub fn load<S: AsRef<str>>(path: Option<&Path>, cli_regions: &[S]) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = std::env::var(CONFIG_PATH_ENV)
                    .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
                let default_path = Path::new(&default_path);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };

        let env_regions = if cli_regions.is_empty() {
            std::env::var(REGIONS_ENV).ok()
        } else {
            None
        };
        config.resolve_regions(env_regions.as_deref(), cli_regions)?;

        Ok(config)
    }

    /// Applies region overrides. Only the highest-precedence source present
    /// is validated.
    pub fn resolve_regions<S: AsRef<str>>(
        &mut self,
        env_list: Option<&str>,
        cli_regions: &[S],
    ) -> Result<(), ConfigError> {
        if !cli_regions.is_empty() {
            self.set_regions(cli_regions)
        } else if let Some(list) = env_list {
            self.set_regions(&split_region_list(list))
        } else {
            Ok(())
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ConfigError::Syntax { message, .. } => ConfigError::Syntax {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::Syntax {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;

        let mut config = Config::default();

        if let Some(regions) = file.query.regions {
            config.set_regions(&regions)?;
        }
        if let Some(timeout) = file.query.timeout_secs {
            if timeout == 0 {
                return Err(ConfigError::InvalidTimeout);
            }
            config.timeout_secs = timeout;
        }
        if let Some(level) = file.logging.level {
            config.log_level = parse_log_level(&level)?;
        }
        config.log_file = file.logging.file.filter(|f| !f.trim().is_empty());
        config.console_timestamps = file.logging.timestamps;

        Ok(config)
    }

    /// Replaces the region list after validating and normalizing it.
    pub fn set_regions<S: AsRef<str>>(&mut self, codes: &[S]) -> Result<(), ConfigError> {
        let regions = regions::normalize_region_list(codes).map_err(|e| match e {
            crate::model::NwisError::UnknownRegion(code) => ConfigError::InvalidRegion(code),
            other => ConfigError::InvalidRegion(other.to_string()),
        })?;
        if regions.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        self.regions = regions;
        Ok(())
    }
}

fn split_region_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

pub fn parse_log_level(level: &str) -> Result<LogLevel, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "debug" => Ok(LogLevel::Debug),
        "info" => Ok(LogLevel::Info),
        "warn" | "warning" => Ok(LogLevel::Warning),
        "error" => Ok(LogLevel::Error),
        other => Err(ConfigError::InvalidLogLevel(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
