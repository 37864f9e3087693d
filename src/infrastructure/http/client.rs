//! HTTP snapshot fetcher for the Jenkins JSON API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{instrument, trace};

use crate::domain::errors::FetchError;
use crate::domain::models::{FetchConfig, JenkinsConfig};
use crate::domain::ports::SnapshotFetcher;

use super::retry::RetryPolicy;

/// Failure of a single attempt. Never leaves this module except as text.
#[derive(Debug, Error)]
enum AttemptError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("server returned {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid JSON document: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Configuration for [`HttpFetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Appended to the document URL, e.g. `api/json`
    pub api_suffix: String,
    /// Timeout of one attempt
    pub attempt_timeout: Duration,
    /// Attempts per document
    pub max_attempts: u32,
    /// Pause between attempts
    pub retry_interval: Duration,
}

impl HttpFetcherConfig {
    /// Settings taken from the `jenkins` and `fetch` config sections.
    pub fn from_config(jenkins: &JenkinsConfig, fetch: &FetchConfig) -> Self {
        Self {
            api_suffix: jenkins.api_suffix.clone(),
            attempt_timeout: Duration::from_secs(fetch.attempt_timeout_secs),
            max_attempts: fetch.max_attempts,
            retry_interval: Duration::from_millis(fetch.retry_interval_ms),
        }
    }
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self::from_config(&JenkinsConfig::default(), &FetchConfig::default())
    }
}

/// Fetches `GET {url}/{api_suffix}` with bounded retries.
///
/// Transport errors, non-success statuses and undecodable bodies all count
/// as one failed attempt.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    api_suffix: String,
    retry_policy: RetryPolicy,
}

impl HttpFetcher {
    /// Build the shared client. Fails only if TLS setup fails.
    pub fn new(config: HttpFetcherConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(config.attempt_timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            http,
            api_suffix: config.api_suffix.trim_matches('/').to_string(),
            retry_policy: RetryPolicy::new(config.max_attempts, config.retry_interval),
        })
    }

    /// Document URL for a job, view or build URL.
    pub fn document_url(&self, url: &str) -> String {
        format!("{}/{}", url.trim_end_matches('/'), self.api_suffix)
    }

    async fn attempt(&self, document_url: &str) -> Result<Value, AttemptError> {
        let response = self
            .http
            .get(document_url)
            .send()
            .await
            .map_err(AttemptError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }

        response.json::<Value>().await.map_err(AttemptError::Decode)
    }
}

#[async_trait]
impl SnapshotFetcher for HttpFetcher {
    #[instrument(skip(self), level = "debug")]
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let document_url = self.document_url(url);
        trace!(document_url = %document_url, "fetching document");
        self.retry_policy
            .execute(url, |_| self.attempt(&document_url))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_url_joins_single_slash() {
        let fetcher = HttpFetcher::new(HttpFetcherConfig::default()).unwrap();
        assert_eq!(
            fetcher.document_url("http://ci/job/build-a/"),
            "http://ci/job/build-a/api/json"
        );
        assert_eq!(
            fetcher.document_url("http://ci/job/build-a"),
            "http://ci/job/build-a/api/json"
        );
    }

    #[test]
    fn test_suffix_is_normalized() {
        let fetcher = HttpFetcher::new(HttpFetcherConfig {
            api_suffix: "/api/json/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(fetcher.document_url("http://ci"), "http://ci/api/json");
    }
}
