use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use regex::Regex;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to load config from {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("Jenkins URL cannot be empty")]
    EmptyServerUrl,

    #[error("Invalid max_attempts: {0}. Must be at least 1")]
    InvalidMaxAttempts(u32),

    #[error("Invalid concurrency: {0}. Must be at least 1")]
    InvalidConcurrency(usize),

    #[error("Invalid poll interval: {0}s. Must be at least 1")]
    InvalidPollInterval(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid pattern '{pattern}' for light '{light}': {source}")]
    InvalidPattern {
        light: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Environment variable prefix; nested keys are split on `__`
    pub const ENV_PREFIX: &'static str = "BUILDBEACON_";

    /// Load configuration from a specific file
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. The YAML file at `path`
    /// 3. Environment variables (BUILDBEACON_* prefix)
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .map_err(|source| ConfigError::Load {
                path: path.display().to_string(),
                source: Box::new(source),
            })?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.jenkins.url.trim().is_empty() {
            return Err(ConfigError::EmptyServerUrl);
        }

        if config.fetch.max_attempts == 0 {
            return Err(ConfigError::InvalidMaxAttempts(config.fetch.max_attempts));
        }

        if config.fetch.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(config.fetch.concurrency));
        }

        if config.poll.interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval(config.poll.interval_secs));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        for light in &config.virtual_lights {
            if light.name.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "virtual light name cannot be empty".to_string(),
                ));
            }
        }

        for alert in &config.alerts {
            if alert.light.is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "alert light name cannot be empty".to_string(),
                ));
            }
            if alert.jobs_to_watch.is_empty() {
                return Err(ConfigError::ValidationFailed(format!(
                    "alert '{}' watches no jobs",
                    alert.light
                )));
            }
            for pattern in &alert.jobs_to_watch {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    light: alert.light.clone(),
                    pattern: pattern.clone(),
                    source,
                })?;
            }
        }

        Ok(())
    }
}
