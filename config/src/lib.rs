//! Configuration for Cadence.
//!
//! Loaded from `~/.cadence/config.toml`, or from the file named by
//! `CADENCE_CONFIG`. A missing file is not an error; every field is optional.
//!
//! ```toml
//! [interval]
//! delay_ms = 1000
//! enabled = true
//! max_ticks = 10
//!
//! [log]
//! filter = "info"
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cadence_types::{Delay, DelayError};
use serde::Deserialize;
use thiserror::Error;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "CADENCE_CONFIG";
/// Overrides `[interval] delay_ms`. `off` or empty disables the timer.
pub const DELAY_ENV: &str = "CADENCE_DELAY_MS";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid interval delay: {source}")]
    Delay {
        #[from]
        source: DelayError,
    },
    #[error("CADENCE_DELAY_MS must be a number of milliseconds or \"off\" (got {value:?})")]
    DelayOverride { value: String },
}

impl ConfigError {
    /// The config file involved, if the error came from reading one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path),
            ConfigError::Delay { .. } | ConfigError::DelayOverride { .. } => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CadenceConfig {
    pub interval: Option<IntervalConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Deserialize)]
pub struct IntervalConfig {
    /// Tick period in milliseconds. Absent means disabled.
    pub delay_ms: Option<f64>,
    /// Set to false to disable the timer without removing `delay_ms`.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Stop after this many ticks. Absent means run until interrupted.
    pub max_ticks: Option<u64>,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            delay_ms: None,
            enabled: true,
            max_ticks: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive, e.g. `"cadence_core=debug,info"`.
    pub filter: Option<String>,
}

impl CadenceConfig {
    /// Load from the default location. `Ok(None)` if there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from `path`. `Ok(None)` if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// The delay described by `[interval]`, ignoring the environment.
    pub fn delay(&self) -> Result<Delay, ConfigError> {
        match &self.interval {
            Some(interval) if interval.enabled => Ok(Delay::from_millis(interval.delay_ms)?),
            _ => Ok(Delay::Disabled),
        }
    }

    #[must_use]
    pub fn max_ticks(&self) -> Option<u64> {
        self.interval.as_ref().and_then(|interval| interval.max_ticks)
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.log.as_ref().and_then(|log| log.filter.as_deref())
    }
}

/// Resolve the effective delay: `CADENCE_DELAY_MS` wins over the config file.
pub fn resolve_delay(config: Option<&CadenceConfig>) -> Result<Delay, ConfigError> {
    resolve_delay_with(config, env::var(DELAY_ENV).ok().as_deref())
}

/// [`resolve_delay`] with the override value supplied by the caller.
pub fn resolve_delay_with(
    config: Option<&CadenceConfig>,
    env_override: Option<&str>,
) -> Result<Delay, ConfigError> {
    if let Some(raw) = env_override {
        return parse_delay_override(raw);
    }
    config.map_or(Ok(Delay::Disabled), CadenceConfig::delay)
}

fn parse_delay_override(raw: &str) -> Result<Delay, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("off") {
        return Ok(Delay::Disabled);
    }
    let ms = trimmed
        .parse::<f64>()
        .map_err(|_| ConfigError::DelayOverride {
            value: raw.to_string(),
        })?;
    Ok(Delay::from_millis(Some(ms))?)
}

fn config_path() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".cadence").join("config.toml"))
}
