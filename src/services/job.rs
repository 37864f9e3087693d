//! Monitored job entity shared between the directory and alert evaluators.

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::errors::{FetchError, SnapshotError};
use crate::domain::models::{BuildDetail, JobHealth, JobName, JobSnapshot, JobVerdict, UnknownHealthPolicy};
use crate::domain::ports::SnapshotFetcher;

/// Result of a completed [`Job::update`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobUpdate {
    /// Health refreshed from a complete snapshot
    Fresh(JobHealth),
    /// Snapshot was incomplete; health reset to unknown
    Insufficient(SnapshotError),
}

/// A CI job identified by URL.
///
/// The health lock is held for the whole of an update, so two updates of
/// the same job never interleave and readers never see a half-written value.
#[derive(Debug)]
pub struct Job {
    url: String,
    name: Mutex<JobName>,
    health: Mutex<JobHealth>,
}

impl Job {
    /// Job whose name is fetched on first access
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: Mutex::new(JobName::Unresolved { url: url.clone() }),
            url,
            health: Mutex::new(JobHealth::unknown()),
        }
    }

    /// Job whose name is already known from a listing
    pub fn named(url: impl Into<String>, name: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            name: Mutex::new(JobName::Resolved {
                url: url.clone(),
                name: name.into(),
            }),
            url,
            health: Mutex::new(JobHealth::unknown()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Name if already resolved, without fetching
    pub async fn cached_name(&self) -> Option<String> {
        self.name.lock().await.name().map(str::to_string)
    }

    /// Name, fetching the job document once if it is not known yet.
    ///
    /// A document without a `name` falls back to the URL.
    pub async fn name(&self, fetcher: &dyn SnapshotFetcher) -> Result<String, FetchError> {
        let mut name = self.name.lock().await;
        if let Some(resolved) = name.name() {
            return Ok(resolved.to_string());
        }

        let document = fetcher.fetch(&self.url).await?;
        let resolved = document
            .get("name")
            .and_then(serde_json::Value::as_str)
            .map_or_else(|| self.url.clone(), str::to_string);
        name.resolve(resolved.clone());
        Ok(resolved)
    }

    /// Current health, as of the last completed update
    pub async fn health(&self) -> JobHealth {
        self.health.lock().await.clone()
    }

    /// Verdict from the current health, named by the cached name or the URL.
    pub async fn verdict(&self, tolerated_failures: u64, policy: UnknownHealthPolicy) -> JobVerdict {
        let health = self.health().await;
        JobVerdict {
            name: self
                .cached_name()
                .await
                .unwrap_or_else(|| self.url.clone()),
            ok: health.ok(tolerated_failures, policy),
            claimed: health.claimed,
        }
    }

    /// Refresh health from the job document and its last completed build.
    ///
    /// Incomplete documents reset health to unknown and are reported as
    /// [`JobUpdate::Insufficient`]. A fetch error also resets health before
    /// being returned.
    pub async fn update(&self, fetcher: &dyn SnapshotFetcher) -> Result<JobUpdate, FetchError> {
        let mut health = self.health.lock().await;

        match self.read_health(fetcher).await {
            Ok(Ok(fresh)) => {
                if !fresh.last_ok() {
                    debug!(
                        url = %self.url,
                        streak = fresh.consecutive_failure_count(),
                        claimed = fresh.claimed,
                        "job is not stable"
                    );
                }
                *health = fresh.clone();
                Ok(JobUpdate::Fresh(fresh))
            }
            Ok(Err(data_error)) => {
                warn!(url = %self.url, error = %data_error, "missing data in job document");
                *health = JobHealth::unknown();
                Ok(JobUpdate::Insufficient(data_error))
            }
            Err(fetch_error) => {
                *health = JobHealth::unknown();
                Err(fetch_error)
            }
        }
    }

    async fn read_health(
        &self,
        fetcher: &dyn SnapshotFetcher,
    ) -> Result<Result<JobHealth, SnapshotError>, FetchError> {
        let document = fetcher.fetch(&self.url).await?;
        let snapshot = match JobSnapshot::from_value(&self.url, &document) {
            Ok(snapshot) => snapshot,
            Err(err) => return Ok(Err(err)),
        };

        let build_document = fetcher.fetch(&snapshot.last_completed_url).await?;
        let detail = match BuildDetail::from_value(&snapshot.last_completed_url, &build_document) {
            Ok(detail) => detail,
            Err(err) => return Ok(Err(err)),
        };

        Ok(Ok(JobHealth {
            oldest_build: Some(snapshot.oldest_build),
            last_completed_build: Some(detail.number),
            last_failed_build: snapshot.last_failed_build,
            last_stable_build: snapshot.last_stable_build,
            claimed: detail.claimed,
        }))
    }
}
