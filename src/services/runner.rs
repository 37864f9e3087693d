//! Orchestrator: builds the alert composition and drives the poll cycle.
//!
//! A [`Composition`] is everything derived from one configuration load: the
//! fetcher, the job directory, the lights and the alert evaluators. `restart`
//! builds a new composition from scratch and swaps it in as a whole; `tick`
//! works on whichever composition was current when it started. Both take the
//! cycle lock, so ticks never overlap and a restart never lands mid-tick.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{error, info, instrument, warn};

use crate::domain::errors::{FetchError, LightError};
use crate::domain::models::{AlertConfig, Config, LightState};
use crate::domain::ports::{Light, LightBridge, SnapshotFetcher};
use crate::infrastructure::config::{ConfigError, ConfigLoader};
use crate::infrastructure::lights::{VirtualBridge, VirtualLight};

use super::alert_evaluator::{AlertEvaluator, AlertOutcome, EvaluationError};
use super::connector::Connector;
use super::job::{Job, JobUpdate};
use super::job_directory::{JobDirectory, ResolveError};

/// Errors that stop the runner. Every variant is fatal to the process.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid job pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("configured light '{light}' does not exist; available lights: {}", .available.join(", "))]
    MissingLight { light: String, available: Vec<String> },

    #[error("light bridge unavailable: {0}")]
    Bridge(#[source] LightError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("runner has no composition; call restart first")]
    NotStarted,
}

impl From<ResolveError> for RunnerError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::InvalidPattern { pattern, source } => Self::InvalidPattern { pattern, source },
            ResolveError::Fetch(fetch) => Self::Fetch(fetch),
        }
    }
}

/// Result of one evaluation pass
#[derive(Debug, Clone, Serialize)]
pub struct TickReport {
    /// When the last light was set
    pub finished_at: DateTime<Utc>,
    /// Distinct jobs updated this tick
    pub jobs_updated: usize,
    /// Jobs whose documents were incomplete
    pub jobs_with_missing_data: usize,
    /// Outcomes of the lights that were set
    pub alerts: Vec<AlertOutcome>,
    /// Lights that could not be set, with the error
    pub light_failures: Vec<(String, String)>,
}

impl TickReport {
    /// State reported for `light`, if an alert drove it this tick.
    pub fn state_of(&self, light: &str) -> Option<LightState> {
        self.alerts
            .iter()
            .find(|outcome| outcome.light == light)
            .map(|outcome| outcome.state)
    }
}

/// Everything built from one configuration load
pub struct Composition {
    config: Config,
    fetcher: Arc<dyn SnapshotFetcher>,
    directory: JobDirectory,
    lights: Vec<Arc<dyn Light>>,
    evaluators: Vec<AlertEvaluator>,
}

impl Composition {
    /// Configuration this composition was built from
    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn directory(&self) -> &JobDirectory {
        &self.directory
    }

    /// One evaluator per configured alert, in config order
    pub fn evaluators(&self) -> &[AlertEvaluator] {
        &self.evaluators
    }

    pub fn fetcher(&self) -> &dyn SnapshotFetcher {
        self.fetcher.as_ref()
    }

    /// Names of every known light, including synthesized ones
    pub fn light_names(&self) -> Vec<&str> {
        self.lights.iter().map(|light| light.name()).collect()
    }

    /// Each job watched by any evaluator, once
    fn distinct_jobs(&self) -> Vec<Arc<Job>> {
        let mut seen = HashSet::new();
        self.evaluators
            .iter()
            .flat_map(|evaluator| evaluator.jobs().iter())
            .filter(|job| seen.insert(job.url().to_string()))
            .cloned()
            .collect()
    }

    async fn tick(&self) -> Result<TickReport, RunnerError> {
        let jobs = self.distinct_jobs();
        let jobs_updated = jobs.len();

        let results: Vec<Result<JobUpdate, FetchError>> = stream::iter(jobs)
            .map(|job| {
                let fetcher = Arc::clone(&self.fetcher);
                async move { job.update(fetcher.as_ref()).await }
            })
            .buffer_unordered(self.config.fetch.concurrency.max(1))
            .collect()
            .await;

        let mut jobs_with_missing_data = 0;
        for result in results {
            match result {
                Ok(JobUpdate::Fresh(_)) => {}
                Ok(JobUpdate::Insufficient(_)) => jobs_with_missing_data += 1,
                Err(fetch_error) => return Err(fetch_error.into()),
            }
        }

        let mut alerts = Vec::with_capacity(self.evaluators.len());
        let mut light_failures = Vec::new();
        for evaluator in &self.evaluators {
            match evaluator.apply().await {
                Ok(outcome) => {
                    info!(
                        light = %outcome.light,
                        state = %outcome.state,
                        failing = ?outcome.failing_jobs(),
                        "alert evaluated"
                    );
                    alerts.push(outcome);
                }
                Err(EvaluationError::Light { light, source }) => {
                    error!(light = %light, error = %source, "failed to set light");
                    light_failures.push((light, source.to_string()));
                }
                Err(EvaluationError::Fetch(fetch_error)) => return Err(fetch_error.into()),
            }
        }

        Ok(TickReport {
            finished_at: Utc::now(),
            jobs_updated,
            jobs_with_missing_data,
            alerts,
            light_failures,
        })
    }
}

impl std::fmt::Debug for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composition")
            .field("server", &self.directory.server_url())
            .field("lights", &self.light_names())
            .field("evaluators", &self.evaluators)
            .finish_non_exhaustive()
    }
}

/// Drives restart and tick for one configuration file.
pub struct Runner {
    config_path: PathBuf,
    connector: Arc<dyn Connector>,
    create_missing_lights: bool,
    composition: RwLock<Option<Arc<Composition>>>,
    cycle: Mutex<()>,
}

impl Runner {
    /// Runner with no composition yet. Nothing is fetched until [`restart`](Self::restart).
    pub fn new(
        config_path: impl Into<PathBuf>,
        connector: Arc<dyn Connector>,
        create_missing_lights: bool,
    ) -> Self {
        Self {
            config_path: config_path.into(),
            connector,
            create_missing_lights,
            composition: RwLock::new(None),
            cycle: Mutex::new(()),
        }
    }

    /// Construct and perform the initial composition.
    pub async fn start(
        config_path: impl Into<PathBuf>,
        connector: Arc<dyn Connector>,
        create_missing_lights: bool,
    ) -> Result<Self, RunnerError> {
        let runner = Self::new(config_path, connector, create_missing_lights);
        runner.restart().await?;
        info!("initialisation done");
        Ok(runner)
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Current composition, if any
    pub async fn composition(&self) -> Option<Arc<Composition>> {
        self.composition.read().await.clone()
    }

    async fn current(&self) -> Result<Arc<Composition>, RunnerError> {
        self.composition().await.ok_or(RunnerError::NotStarted)
    }

    /// Reload configuration, lights and jobs, and replace the composition.
    ///
    /// On error the previous composition stays installed.
    #[instrument(skip(self), fields(config = %self.config_path.display()))]
    pub async fn restart(&self) -> Result<(), RunnerError> {
        let _cycle = self.cycle.lock().await;
        info!("soft restart");
        let composition = self.compose().await?;
        *self.composition.write().await = Some(Arc::new(composition));
        Ok(())
    }

    /// Update every watched job and set every light.
    pub async fn tick(&self) -> Result<TickReport, RunnerError> {
        let _cycle = self.cycle.lock().await;
        let composition = self.current().await?;
        composition.tick().await
    }

    /// Tick every `poll.interval_secs` until `shutdown_rx` fires.
    ///
    /// A message on `restart_rx`, or every `poll.restart_every_ticks` ticks,
    /// triggers a restart. The restarted composition's `poll` settings take
    /// effect at once, and its first tick is one full interval later.
    /// Returns the first fatal error.
    pub async fn run(
        &self,
        mut shutdown_rx: broadcast::Receiver<()>,
        mut restart_rx: mpsc::Receiver<()>,
    ) -> Result<(), RunnerError> {
        let mut poll = self.current().await?.config.poll.clone();
        let mut interval = poll_interval(poll.interval_secs, Instant::now());
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!(ticks, "shutdown requested");
                    return Ok(());
                }
                Some(()) = restart_rx.recv() => {
                    self.restart().await?;
                    poll = self.current().await?.config.poll.clone();
                    interval = next_poll_interval(poll.interval_secs);
                }
                _ = interval.tick() => {
                    self.tick().await?;
                    ticks += 1;
                    if let Some(every) = poll.restart_every_ticks.filter(|every| *every > 0) {
                        if ticks % every == 0 {
                            self.restart().await?;
                            poll = self.current().await?.config.poll.clone();
                            interval = next_poll_interval(poll.interval_secs);
                        }
                    }
                }
            }
        }
    }

    async fn compose(&self) -> Result<Composition, RunnerError> {
        let config = ConfigLoader::load_from_file(&self.config_path)?;
        let fetcher = self.connector.fetcher(&config)?;

        let mut lights: Vec<Arc<dyn Light>> = match self.connector.bridge(&config)? {
            Some(bridge) => bridge.lights().await.map_err(RunnerError::Bridge)?,
            None => Vec::new(),
        };
        lights.extend(
            VirtualBridge::new(&config.virtual_lights)
                .lights()
                .await
                .map_err(RunnerError::Bridge)?,
        );

        let directory = JobDirectory::load(&config.jenkins.url, fetcher.as_ref()).await?;
        let create_missing_lights = self.create_missing_lights || config.create_missing_lights;

        let mut evaluators = Vec::with_capacity(config.alerts.len());
        for alert in &config.alerts {
            evaluators.push(
                create_alert(
                    alert,
                    &mut lights,
                    &directory,
                    fetcher.as_ref(),
                    &config,
                    create_missing_lights,
                )
                .await?,
            );
        }

        Ok(Composition {
            config,
            fetcher,
            directory,
            lights,
            evaluators,
        })
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config_path", &self.config_path)
            .field("create_missing_lights", &self.create_missing_lights)
            .finish_non_exhaustive()
    }
}

fn poll_interval(secs: u64, first_tick: Instant) -> Interval {
    let mut interval = interval_at(first_tick, Duration::from_secs(secs.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Interval for a freshly restarted composition; first tick one period from now.
fn next_poll_interval(secs: u64) -> Interval {
    poll_interval(secs, Instant::now() + Duration::from_secs(secs.max(1)))
}

/// Build one evaluator: resolve patterns, drop ignored jobs, find the light.
async fn create_alert(
    alert: &AlertConfig,
    lights: &mut Vec<Arc<dyn Light>>,
    directory: &JobDirectory,
    fetcher: &dyn SnapshotFetcher,
    config: &Config,
    create_missing_lights: bool,
) -> Result<AlertEvaluator, RunnerError> {
    let ignored: HashSet<String> = alert.jobs_to_ignore.iter().cloned().collect();

    let mut resolved = Vec::new();
    for pattern in &alert.jobs_to_watch {
        resolved.extend(directory.resolve(pattern, fetcher).await?);
    }

    let mut monitored = Vec::with_capacity(resolved.len());
    let mut names: HashMap<String, String> = HashMap::new();
    for job in resolved {
        let name = job.name(fetcher).await?;
        if !ignored.contains(&name) {
            names.insert(job.url().to_string(), name);
            monitored.push(job);
        }
    }

    info!(
        light = %alert.light,
        jobs = names.len(),
        allowed_fails = alert.num_ignored_fails,
        "{} watches {} jobs and allows {} fails",
        alert.light,
        names.len(),
        alert.num_ignored_fails
    );
    if !ignored.is_empty() {
        info!(light = %alert.light, ignored = %ignore_list(&ignored), "explicitly ignoring jobs");
    }

    let light = match lights.iter().find(|light| light.name() == alert.light) {
        Some(light) => Arc::clone(light),
        None => {
            warn!(light = %alert.light, "configured light does not exist");
            if !create_missing_lights {
                return Err(RunnerError::MissingLight {
                    light: alert.light.clone(),
                    available: lights.iter().map(|light| light.name().to_string()).collect(),
                });
            }
            info!(light = %alert.light, "creating virtual light");
            let light: Arc<dyn Light> = Arc::new(VirtualLight::new(alert.light.clone(), true));
            lights.push(Arc::clone(&light));
            light
        }
    };

    Ok(AlertEvaluator::new(
        light,
        monitored,
        alert.num_ignored_fails,
        ignored,
        config.health.unknown,
    ))
}

/// Comma-separated ignored names, sorted and unique.
fn ignore_list(ignored: &HashSet<String>) -> String {
    let mut listed: Vec<&str> = ignored.iter().map(String::as_str).collect();
    listed.sort_unstable();
    listed.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignore_list_collapses_scattered_duplicates() {
        let ignored: HashSet<String> = ["web", "api", "web", "docs", "api"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(ignore_list(&ignored), "api,docs,web");
    }

    #[tokio::test]
    async fn test_restarted_interval_waits_a_full_period() {
        let mut first = poll_interval(3600, Instant::now());
        let mut restarted = next_poll_interval(3600);

        assert_eq!(restarted.period(), Duration::from_secs(3600));
        assert!(tokio::time::timeout(Duration::from_millis(50), first.tick()).await.is_ok());
        assert!(tokio::time::timeout(Duration::from_millis(50), restarted.tick()).await.is_err());
    }
}
