use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::job::UnknownHealthPolicy;

/// Main configuration structure for buildbeacon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// CI server to poll
    #[serde(default)]
    pub jenkins: JenkinsConfig,

    /// Fetch retry and concurrency settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Poll loop settings
    #[serde(default)]
    pub poll: PollConfig,

    /// Health derivation policy
    #[serde(default)]
    pub health: HealthConfig,

    /// Optional physical light bridge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge: Option<BridgeConfig>,

    /// Synthesize a virtual light when an alert names a light that does not exist
    #[serde(default)]
    pub create_missing_lights: bool,

    /// Lights with no physical backing
    #[serde(default)]
    pub virtual_lights: Vec<VirtualLightConfig>,

    /// One entry per driven light
    #[serde(default)]
    pub alerts: Vec<AlertConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jenkins: JenkinsConfig::default(),
            fetch: FetchConfig::default(),
            poll: PollConfig::default(),
            health: HealthConfig::default(),
            bridge: None,
            create_missing_lights: false,
            virtual_lights: vec![],
            alerts: vec![],
            logging: LoggingConfig::default(),
        }
    }
}

/// CI server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JenkinsConfig {
    /// Base URL of the server
    #[serde(default = "default_jenkins_url")]
    pub url: String,

    /// Path appended to every job, view and build URL to get its document
    #[serde(default = "default_api_suffix")]
    pub api_suffix: String,
}

fn default_jenkins_url() -> String {
    "http://localhost:8080/".to_string()
}

fn default_api_suffix() -> String {
    "api/json".to_string()
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: default_jenkins_url(),
            api_suffix: default_api_suffix(),
        }
    }
}

/// Fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FetchConfig {
    /// Attempts per document before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Timeout of a single attempt in seconds
    #[serde(default = "default_attempt_timeout_secs")]
    pub attempt_timeout_secs: u64,

    /// Fixed pause between attempts in milliseconds
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Jobs updated in parallel during a tick
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

const fn default_max_attempts() -> u32 {
    10
}

const fn default_attempt_timeout_secs() -> u64 {
    10
}

const fn default_retry_interval_ms() -> u64 {
    1000
}

const fn default_concurrency() -> usize {
    8
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            attempt_timeout_secs: default_attempt_timeout_secs(),
            retry_interval_ms: default_retry_interval_ms(),
            concurrency: default_concurrency(),
        }
    }
}

/// Poll loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PollConfig {
    /// Seconds between ticks
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Rebuild the whole composition after this many ticks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_every_ticks: Option<u64>,
}

const fn default_interval_secs() -> u64 {
    60
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            restart_every_ticks: None,
        }
    }
}

/// Health policy configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthConfig {
    /// How jobs with insufficient build data are judged
    #[serde(default)]
    pub unknown: UnknownHealthPolicy,
}

/// Light bridge connection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BridgeConfig {
    /// Base URL of the bridge
    pub url: String,

    /// Pre-registered bridge username
    pub username: String,

    /// Request timeout in seconds
    #[serde(default = "default_bridge_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_bridge_timeout_secs() -> u64 {
    5
}

/// Virtual light declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VirtualLightConfig {
    /// Light name referenced by alerts
    pub name: String,

    /// Log every state change at info level
    #[serde(default)]
    pub debug: bool,
}

/// One light driven by a set of watched jobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AlertConfig {
    /// Name of the light to drive
    pub light: String,

    /// Job or view name patterns
    pub jobs_to_watch: Vec<String>,

    /// Consecutive failures still considered acceptable
    #[serde(default)]
    pub num_ignored_fails: u64,

    /// Job names excluded even when a pattern matches them
    #[serde(default)]
    pub jobs_to_ignore: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Stdout format
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for rolling JSON log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Log file rotation
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

/// Stderr log format
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Human-readable lines
    #[default]
    Pretty,
}

/// How often the log file rolls over
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    /// Single file, never rotated
    Never,
}
