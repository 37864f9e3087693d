//! Tracing subscriber setup from the logging config.

use anyhow::Result;
use std::io;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::domain::models::{LogFormat, LoggingConfig, RotationPolicy};

const LOG_FILE_NAME: &str = "buildbeacon.log";

/// Logger implementation using tracing
pub struct LoggerImpl {
    _guard: Option<WorkerGuard>,
}

impl LoggerImpl {
    /// Initialize the global subscriber from the logging configuration
    ///
    /// `RUST_LOG` overrides the configured level. When `log_dir` is set, a
    /// rolling JSON file layer is added next to the stderr layer.
    ///
    /// # Errors
    /// Returns an error if the level is invalid or a subscriber is already set
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let default_level = parse_log_level(&config.level)?;

        let env_filter = || {
            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy()
        };

        let console_layer = match config.format {
            LogFormat::Json => tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_current_span(true)
                .with_target(true)
                .with_filter(env_filter())
                .boxed(),
            LogFormat::Pretty => tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(env_filter())
                .boxed(),
        };

        let (file_layer, guard) = match config.log_dir {
            Some(ref log_dir) => {
                let file_appender = match config.rotation {
                    RotationPolicy::Daily => rolling::daily(log_dir, LOG_FILE_NAME),
                    RotationPolicy::Hourly => rolling::hourly(log_dir, LOG_FILE_NAME),
                    RotationPolicy::Never => rolling::never(log_dir, LOG_FILE_NAME),
                };
                let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

                // File layer - always JSON for structured logging
                let layer = tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking_file)
                    .with_ansi(false)
                    .with_current_span(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(env_filter())
                    .boxed();
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        tracing::debug!(
            level = %config.level,
            format = ?config.format,
            file_output = config.log_dir.is_some(),
            "logger initialized"
        );

        Ok(Self { _guard: guard })
    }
}

/// Parse log level string to Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {level}"),
    }
}
