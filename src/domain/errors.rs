//! Domain errors for the buildbeacon polling system.

use thiserror::Error;

/// Errors returned by a [`SnapshotFetcher`](crate::domain::ports::SnapshotFetcher).
///
/// A fetcher retries internally; callers only ever see the exhausted outcome.
/// Whether exhaustion is fatal is decided by the orchestrator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("failed to fetch {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

impl FetchError {
    /// URL whose fetch failed.
    pub fn url(&self) -> &str {
        match self {
            Self::Exhausted { url, .. } => url,
        }
    }
}

/// A fetched document did not contain what the health model needs.
///
/// Recovered locally: the job's health is reset to unknown.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("snapshot from {url} is missing field `{field}`")]
    MissingField { url: String, field: &'static str },

    #[error("snapshot from {url} has no builds")]
    EmptyBuilds { url: String },

    #[error("snapshot from {url} has an invalid `{field}` field")]
    InvalidField { url: String, field: &'static str },
}

/// Errors raised by light bridges and individual lights.
#[derive(Debug, Error)]
pub enum LightError {
    #[error("light bridge request failed: {0}")]
    Bridge(String),

    #[error("light bridge returned {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("failed to decode light bridge response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for LightError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Bridge(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_message_names_url_and_attempts() {
        let err = FetchError::Exhausted {
            url: "http://ci/job/a".to_string(),
            attempts: 10,
            last_error: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("http://ci/job/a"));
        assert!(msg.contains("10 attempts"));
        assert!(msg.contains("connection refused"));
        assert_eq!(err.url(), "http://ci/job/a");
    }

    #[test]
    fn test_snapshot_error_names_field() {
        let err = SnapshotError::MissingField {
            url: "http://ci/job/a".to_string(),
            field: "lastStableBuild",
        };
        assert!(err.to_string().contains("`lastStableBuild`"));
    }
}
