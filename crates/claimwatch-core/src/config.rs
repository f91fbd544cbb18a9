//! Configuration loading and typed config structures for Claimwatch.
//!
//! The canonical configuration lives in `claimwatch-config.yaml` at the
//! working directory. Every field has a default, so an empty file (or no
//! file at all) yields the standard dashboard cadence: a 3 second tick, 50 activity
//! entries, and 100 winners.

use std::path::Path;

use serde::Deserialize;

/// Smallest tick interval the store accepts, in milliseconds.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `claimwatch-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClaimwatchConfig {
    /// Store timing, retention, and randomness.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Engine binary settings.
    #[serde(default)]
    pub engine: EngineConfig,
}

impl ClaimwatchConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CLAIMWATCH_SEED` overrides `store.seed`
    /// - `CLAIMWATCH_TICK_INTERVAL_MS` overrides `store.tick_interval_ms`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.store.apply_env_overrides()?;
        config.store.validate()?;
        Ok(config)
    }
}

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Real-time milliseconds between scheduled ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Maximum number of activity entries retained (oldest evicted).
    #[serde(default = "default_max_activities")]
    pub max_activities: usize,

    /// Maximum number of winners retained (trimmed from the tail).
    #[serde(default = "default_max_winners")]
    pub max_winners: usize,

    /// Random seed for reproducible runs. `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl StoreConfig {
    /// Apply `CLAIMWATCH_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override is not a number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("CLAIMWATCH_SEED") {
            let seed = val.trim().parse().map_err(|_err| ConfigError::Invalid {
                reason: format!("CLAIMWATCH_SEED is not a u64: {val}"),
            })?;
            self.seed = Some(seed);
        }
        if let Ok(val) = std::env::var("CLAIMWATCH_TICK_INTERVAL_MS") {
            self.tick_interval_ms = val.trim().parse().map_err(|_err| ConfigError::Invalid {
                reason: format!("CLAIMWATCH_TICK_INTERVAL_MS is not a u64: {val}"),
            })?;
        }
        Ok(())
    }

    /// Check that every value is usable by the store.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a tick interval below
    /// [`MIN_TICK_INTERVAL_MS`] or a zero retention bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS} (got {})",
                    self.tick_interval_ms
                ),
            });
        }
        if self.max_activities == 0 {
            return Err(ConfigError::Invalid {
                reason: "max_activities must be at least 1".to_owned(),
            });
        }
        if self.max_winners == 0 {
            return Err(ConfigError::Invalid {
                reason: "max_winners must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_activities: default_max_activities(),
            max_winners: default_max_winners(),
            seed: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Settings for the `claimwatch-engine` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Wall-clock seconds to run before shutting down (0 = until Ctrl-C).
    #[serde(default)]
    pub run_seconds: u64,

    /// Window name the overview surface projects through.
    #[serde(default = "default_window")]
    pub window: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            run_seconds: 0,
            window: default_window(),
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    3000
}

const fn default_max_activities() -> usize {
    50
}

const fn default_max_winners() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

fn default_window() -> String {
    "this_week".to_owned()
}
