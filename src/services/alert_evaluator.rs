//! One light driven by the aggregate health of many jobs.

use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::errors::{FetchError, LightError};
use crate::domain::models::{aggregate_verdicts, JobVerdict, LightState, UnknownHealthPolicy};
use crate::domain::ports::{Light, SnapshotFetcher};

use super::job::Job;

/// What an evaluation produced for one light
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertOutcome {
    pub light: String,
    /// State pushed to the light
    pub state: LightState,
    /// One verdict per monitored job
    pub verdicts: Vec<JobVerdict>,
}

impl AlertOutcome {
    /// Names of jobs that are not ok
    pub fn failing_jobs(&self) -> Vec<&str> {
        self.verdicts
            .iter()
            .filter(|v| !v.ok)
            .map(|v| v.name.as_str())
            .collect()
    }
}

/// Errors from [`AlertEvaluator::update`]
#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to set light '{light}': {source}")]
    Light {
        light: String,
        #[source]
        source: LightError,
    },
}

/// Keeps no state between evaluations; every call recomputes from the jobs'
/// current health.
pub struct AlertEvaluator {
    light: Arc<dyn Light>,
    jobs: Vec<Arc<Job>>,
    tolerated_failures: u64,
    ignored_jobs: HashSet<String>,
    policy: UnknownHealthPolicy,
}

impl AlertEvaluator {
    /// `jobs` are expected to already exclude `ignored_jobs`; duplicates
    /// (by URL) are dropped.
    pub fn new(
        light: Arc<dyn Light>,
        jobs: Vec<Arc<Job>>,
        tolerated_failures: u64,
        ignored_jobs: HashSet<String>,
        policy: UnknownHealthPolicy,
    ) -> Self {
        let mut seen = HashSet::new();
        let jobs = jobs
            .into_iter()
            .filter(|job| seen.insert(job.url().to_string()))
            .collect();

        Self {
            light,
            jobs,
            tolerated_failures,
            ignored_jobs,
            policy,
        }
    }

    pub fn light_name(&self) -> &str {
        self.light.name()
    }

    /// Monitored jobs, unique by URL
    pub fn jobs(&self) -> &[Arc<Job>] {
        &self.jobs
    }

    /// Consecutive failures still considered ok
    pub const fn tolerated_failures(&self) -> u64 {
        self.tolerated_failures
    }

    /// Job names excluded when the alert was built
    pub fn ignored_jobs(&self) -> &HashSet<String> {
        &self.ignored_jobs
    }

    /// Verdicts of every monitored job and the resulting state, without
    /// touching the light.
    pub async fn evaluate(&self) -> AlertOutcome {
        let mut verdicts = Vec::with_capacity(self.jobs.len());
        for job in &self.jobs {
            verdicts.push(job.verdict(self.tolerated_failures, self.policy).await);
        }

        AlertOutcome {
            light: self.light.name().to_string(),
            state: aggregate_verdicts(&verdicts),
            verdicts,
        }
    }

    /// Evaluate and push the state to the light.
    pub async fn apply(&self) -> Result<AlertOutcome, EvaluationError> {
        let outcome = self.evaluate().await;
        self.light
            .set_state(outcome.state)
            .await
            .map_err(|source| EvaluationError::Light {
                light: outcome.light.clone(),
                source,
            })?;
        Ok(outcome)
    }

    /// Refresh every monitored job, then [`apply`](Self::apply).
    pub async fn update(&self, fetcher: &dyn SnapshotFetcher) -> Result<AlertOutcome, EvaluationError> {
        for job in &self.jobs {
            job.update(fetcher).await?;
        }
        self.apply().await
    }
}

impl std::fmt::Debug for AlertEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertEvaluator")
            .field("light", &self.light.name())
            .field("jobs", &self.jobs.len())
            .field("tolerated_failures", &self.tolerated_failures)
            .field("ignored_jobs", &self.ignored_jobs)
            .finish_non_exhaustive()
    }
}
