//! Decoded CI server documents.
//!
//! Snapshots are decoded from `serde_json::Value` rather than derived structs
//! because a missing key and an explicit `null` mean different things:
//! `"lastFailedBuild": null` is a job that never failed, a missing
//! `lastFailedBuild` key is a malformed snapshot.

use serde_json::Value;

use crate::domain::errors::SnapshotError;

/// A `{name, url}` entry of a server or view listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntry {
    pub name: String,
    pub url: String,
}

/// Top-level server listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerListing {
    /// `None` when the `jobs` key is absent or malformed.
    pub jobs: Option<Vec<NamedEntry>>,
    /// `None` when the `views` key is absent or malformed.
    pub views: Option<Vec<NamedEntry>>,
}

impl ServerListing {
    /// Decode the top-level listing. Absent keys come back as `None`.
    pub fn from_value(value: &Value) -> Self {
        Self {
            jobs: named_entries(value.get("jobs")),
            views: named_entries(value.get("views")),
        }
    }
}

/// Names of the jobs a view contains, or `None` if the view has no `jobs` key.
pub fn view_job_names(value: &Value) -> Option<Vec<String>> {
    value.get("jobs")?.as_array().map(|jobs| {
        jobs.iter()
            .filter_map(|job| job.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    })
}

fn named_entries(value: Option<&Value>) -> Option<Vec<NamedEntry>> {
    let entries = value?.as_array()?;
    Some(
        entries
            .iter()
            .filter_map(|entry| {
                Some(NamedEntry {
                    name: entry.get("name")?.as_str()?.to_string(),
                    url: entry.get("url")?.as_str()?.to_string(),
                })
            })
            .collect(),
    )
}

/// Per-job document: build history summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    /// Smallest build number in `builds`
    pub oldest_build: u64,
    /// `None` when the server reports null
    pub last_failed_build: Option<u64>,
    /// `None` when the server reports null
    pub last_stable_build: Option<u64>,
    /// URL of the last completed build, fetched again for its detail.
    pub last_completed_url: String,
}

impl JobSnapshot {
    /// Decode a job document fetched from `url`.
    pub fn from_value(url: &str, value: &Value) -> Result<Self, SnapshotError> {
        let builds = required(url, value, "builds")?
            .as_array()
            .ok_or_else(|| invalid(url, "builds"))?;
        let oldest_build = builds
            .iter()
            .filter_map(|build| build.get("number").and_then(build_number))
            .min()
            .ok_or_else(|| SnapshotError::EmptyBuilds {
                url: url.to_string(),
            })?;

        let last_failed_build = optional_build_number(url, value, "lastFailedBuild")?;
        let last_stable_build = optional_build_number(url, value, "lastStableBuild")?;

        let last_completed_url = required(url, value, "lastCompletedBuild")?
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid(url, "lastCompletedBuild"))?
            .to_string();

        Ok(Self {
            oldest_build,
            last_failed_build,
            last_stable_build,
            last_completed_url,
        })
    }
}

/// Detail document of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDetail {
    pub number: u64,
    /// Some action carries `claimed: true`
    pub claimed: bool,
}

impl BuildDetail {
    /// Decode a build detail document fetched from `url`.
    pub fn from_value(url: &str, value: &Value) -> Result<Self, SnapshotError> {
        let number = required(url, value, "number").and_then(|number| {
            build_number(number).ok_or_else(|| invalid(url, "number"))
        })?;
        let claimed = value
            .get("actions")
            .and_then(Value::as_array)
            .is_some_and(|actions| {
                actions
                    .iter()
                    .any(|action| action.get("claimed").and_then(Value::as_bool) == Some(true))
            });
        Ok(Self { number, claimed })
    }
}

fn required<'a>(url: &str, value: &'a Value, field: &'static str) -> Result<&'a Value, SnapshotError> {
    match value.get(field) {
        Some(Value::Null) | None => Err(SnapshotError::MissingField {
            url: url.to_string(),
            field,
        }),
        Some(found) => Ok(found),
    }
}

fn optional_build_number(
    url: &str,
    value: &Value,
    field: &'static str,
) -> Result<Option<u64>, SnapshotError> {
    match value.get(field) {
        None => Err(SnapshotError::MissingField {
            url: url.to_string(),
            field,
        }),
        Some(Value::Null) => Ok(None),
        Some(build) => Ok(build.get("number").and_then(build_number)),
    }
}

fn build_number(value: &Value) -> Option<u64> {
    // Some servers render build numbers as strings.
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

fn invalid(url: &str, field: &'static str) -> SnapshotError {
    SnapshotError::InvalidField {
        url: url.to_string(),
        field,
    }
}
