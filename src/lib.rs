//! Buildbeacon - CI build lights
//!
//! Buildbeacon polls a Jenkins server for the state of watched jobs and drives
//! indicator lights that show the aggregate health of each group of jobs,
//! tolerating a configurable number of consecutive failures.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): health model, decoded CI documents, port traits
//! - **Service Layer** (`services`): jobs, job directory, alert evaluation, runner
//! - **Infrastructure Layer** (`infrastructure`): HTTP fetcher, lights, config, logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use buildbeacon::services::{HttpConnector, Runner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runner = Runner::start("buildbeacon.yaml", Arc::new(HttpConnector), false).await?;
//!     let report = runner.tick().await?;
//!     println!("{} lights updated", report.alerts.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AlertConfig, Config, JobHealth, JobName, JobVerdict, LightState, StreakBasis,
    UnknownHealthPolicy,
};
pub use domain::ports::{Light, LightBridge, SnapshotFetcher};
pub use domain::{FetchError, LightError, SnapshotError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AlertEvaluator, Job, JobDirectory, Runner, RunnerError, TickReport};
