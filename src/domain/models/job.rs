//! Health model for a single monitored job.
//!
//! A [`JobHealth`] is built from one snapshot of the CI server and is never
//! partially updated: either every build number comes from the same snapshot
//! or the whole value is [`JobHealth::unknown`].

use serde::{Deserialize, Serialize};

/// How a job with insufficient build data is judged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownHealthPolicy {
    /// Unknown data counts as healthy.
    #[default]
    FailOpen,
    /// Unknown data counts as failing.
    FailClosed,
}

impl UnknownHealthPolicy {
    pub const fn is_fail_open(self) -> bool {
        matches!(self, Self::FailOpen)
    }
}

/// Which build numbers a failure streak was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakBasis {
    /// Last failed and last stable are both known: `|failed - stable|`.
    BothKnown { failed: u64, stable: u64 },
    /// The job never had a stable build in the retained history: `failed - oldest`.
    FailedAndOldestKnown { failed: u64, oldest: u64 },
    /// Nothing to count from.
    InsufficientData,
}

impl StreakBasis {
    /// Streak length, or `None` when there is not enough data.
    pub fn count(self) -> Option<u64> {
        match self {
            Self::BothKnown { failed, stable } => Some(failed.abs_diff(stable)),
            Self::FailedAndOldestKnown { failed, oldest } => Some(failed.saturating_sub(oldest)),
            Self::InsufficientData => None,
        }
    }
}

/// Build numbers and claim flag of one job, taken from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHealth {
    /// Oldest build still retained by the server
    pub oldest_build: Option<u64>,
    /// Most recent build that finished
    pub last_completed_build: Option<u64>,
    /// Most recent failed build
    pub last_failed_build: Option<u64>,
    /// Most recent stable build
    pub last_stable_build: Option<u64>,
    /// Someone acknowledged the failure of the last completed build.
    pub claimed: bool,
}

impl JobHealth {
    /// All fields unknown, not claimed.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// No build number is known.
    pub fn is_unknown(&self) -> bool {
        self.oldest_build.is_none()
            && self.last_completed_build.is_none()
            && self.last_failed_build.is_none()
            && self.last_stable_build.is_none()
    }

    /// The most recent completed build is the most recent stable build.
    ///
    /// Two unknown numbers compare equal, so an unknown job is "last ok".
    pub fn last_ok(&self) -> bool {
        self.last_completed_build == self.last_stable_build
    }

    /// Build numbers the failure streak is counted from.
    pub fn streak_basis(&self) -> StreakBasis {
        match (self.last_failed_build, self.last_stable_build, self.oldest_build) {
            (Some(failed), Some(stable), _) => StreakBasis::BothKnown { failed, stable },
            (Some(failed), None, Some(oldest)) => {
                StreakBasis::FailedAndOldestKnown { failed, oldest }
            }
            _ => StreakBasis::InsufficientData,
        }
    }

    /// Consecutive failures since the last stable build; 0 with insufficient data.
    pub fn consecutive_failure_count(&self) -> u64 {
        self.streak_basis().count().unwrap_or(0)
    }

    /// Whether the job is acceptable for alerting purposes.
    ///
    /// A job is ok when its last completed build is stable, or when its failure
    /// streak is within `tolerated_failures`. Under [`UnknownHealthPolicy::FailClosed`]
    /// neither shortcut applies to data that is missing.
    pub fn ok(&self, tolerated_failures: u64, policy: UnknownHealthPolicy) -> bool {
        if self.last_ok() && (self.last_completed_build.is_some() || policy.is_fail_open()) {
            return true;
        }
        match self.streak_basis().count() {
            Some(streak) => streak <= tolerated_failures,
            None => policy.is_fail_open(),
        }
    }
}

/// Lazily resolved job name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobName {
    /// Only the URL is known
    Unresolved { url: String },
    /// Name fetched or listed
    Resolved { url: String, name: String },
}

impl JobName {
    pub fn url(&self) -> &str {
        match self {
            Self::Unresolved { url } | Self::Resolved { url, .. } => url,
        }
    }

    /// Name, if resolved.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Unresolved { .. } => None,
            Self::Resolved { name, .. } => Some(name),
        }
    }

    /// Transition to `Resolved`, keeping the URL.
    pub fn resolve(&mut self, name: impl Into<String>) {
        let url = self.url().to_string();
        *self = Self::Resolved {
            url,
            name: name.into(),
        };
    }
}
