//! Snapshot fetcher port - interface to the CI server query API.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::FetchError;

/// Fetches and decodes the structured document behind a job, view or build URL.
///
/// Implementations retry transient failures themselves and only report
/// [`FetchError::Exhausted`] once their attempt budget is spent.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}
