//! Configuration for the page cache
//!
//! Provides configuration loading from TOML files, default settings,
//! and validation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Cache tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Number of touches a page needs before its contents are fetched and
    /// cached. 1 caches on first touch; raising it keeps cold, rarely
    /// reused pages off the full-page fetch path at the cost of extra
    /// uncached reads.
    #[serde(default = "default_trigger_threshold")]
    pub trigger_threshold: u32,
}

fn default_trigger_threshold() -> u32 {
    1
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            trigger_threshold: default_trigger_threshold(),
        }
    }
}

impl CacheConfig {
    /// Validates the configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.trigger_threshold == 0 {
            return Err(ConfigError::Invalid(
                "trigger_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Loads and saves cache configuration files
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        ConfigLoader {
            config_path: path.as_ref().to_path_buf(),
        }
    }

    /// Loads and validates configuration from file
    pub fn load(&self) -> ConfigResult<CacheConfig> {
        if !self.config_path.exists() {
            return Err(ConfigError::FileNotFound(
                self.config_path.display().to_string(),
            ));
        }

        let contents = fs::read_to_string(&self.config_path)?;
        let config: CacheConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration or returns defaults if loading fails
    pub fn load_or_default(&self) -> CacheConfig {
        self.load().unwrap_or_default()
    }

    /// Saves configuration to file
    pub fn save(&self, config: &CacheConfig) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, contents)?;
        Ok(())
    }
}
