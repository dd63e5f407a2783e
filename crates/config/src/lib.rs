//! Configuration loading, validation and logging setup for runassert.
//!
//! Loads configuration from `~/.runassert/config.toml` with environment
//! variable overrides. Validates all settings before they are used.
//!
//! ```toml
//! [assert]
//! include_info = ["desired-resources", "skipped-resources"]
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use runassert_core::{IncludeInfo, IncludeInfoKey};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.runassert/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Assertion defaults
    #[serde(default)]
    pub assert: AssertConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssertConfig {
    /// Verbosity keys applied to requests that carry none of their own
    /// (`*`, `desired-resources`, `skipped-resources`, `explicit-resources`, `warnings`)
    #[serde(default)]
    pub include_info: Vec<String>,
}

impl AssertConfig {
    /// Parse the configured keys into verbosity flags.
    pub fn include_info(&self) -> Result<IncludeInfo, ConfigError> {
        self.include_info
            .iter()
            .map(|key| {
                key.trim()
                    .parse::<IncludeInfoKey>()
                    .map_err(|e| ConfigError::ValidationError(e.to_string()))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "pretty".into()
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Install a global `tracing` subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured level. Fails if a
    /// subscriber is already installed.
    pub fn init(&self) -> Result<(), ConfigError> {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&self.level));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false);
        let installed = if self.format == "json" {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        installed.map_err(|e| ConfigError::LoggingError(e.to_string()))
    }
}

impl EngineConfig {
    /// Load configuration from the default path (~/.runassert/config.toml).
    ///
    /// Environment variables override file values:
    /// - `RUNASSERT_INCLUDE_INFO` (comma separated keys)
    /// - `RUNASSERT_LOG_LEVEL`
    /// - `RUNASSERT_LOG_FORMAT`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with(&config_path, |key| std::env::var(key).ok())
    }

    /// Load configuration from a specific file path, without env overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with(path, |_| None)
    }

    /// Read `path`, apply overrides from `lookup`, then validate the result.
    fn load_with(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".runassert")
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(keys) = lookup("RUNASSERT_INCLUDE_INFO") {
            self.assert.include_info = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(level) = lookup("RUNASSERT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("RUNASSERT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {LOG_LEVELS:?}, got {:?}",
                self.logging.level
            )));
        }

        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.format must be one of {LOG_FORMATS:?}, got {:?}",
                self.logging.format
            )));
        }

        self.assert.include_info()?;
        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_else(|e| {
            tracing::warn!("Failed to render default config: {e}");
            String::new()
        })
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Failed to install logging subscriber: {0}")]
    LoggingError(String),
}
