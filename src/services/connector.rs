//! Factory for the external collaborators a composition talks to.

use std::sync::Arc;

use crate::domain::models::Config;
use crate::domain::ports::{LightBridge, SnapshotFetcher};
use crate::infrastructure::http::{HttpFetcher, HttpFetcherConfig};
use crate::infrastructure::lights::HueBridge;

use super::runner::RunnerError;

/// Builds a fetcher and an optional light bridge from configuration.
///
/// Called on every restart, so a changed config or a reconnected bridge is
/// picked up without restarting the process.
pub trait Connector: Send + Sync {
    fn fetcher(&self, config: &Config) -> Result<Arc<dyn SnapshotFetcher>, RunnerError>;

    fn bridge(&self, config: &Config) -> Result<Option<Arc<dyn LightBridge>>, RunnerError>;
}

/// Production connector: reqwest fetcher and, when configured, a Hue bridge.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn fetcher(&self, config: &Config) -> Result<Arc<dyn SnapshotFetcher>, RunnerError> {
        let fetcher = HttpFetcher::new(HttpFetcherConfig::from_config(&config.jenkins, &config.fetch))
            .map_err(|e| RunnerError::Client(e.to_string()))?;
        Ok(Arc::new(fetcher))
    }

    fn bridge(&self, config: &Config) -> Result<Option<Arc<dyn LightBridge>>, RunnerError> {
        config
            .bridge
            .as_ref()
            .map(|bridge| {
                HueBridge::new(bridge)
                    .map(|hue| Arc::new(hue) as Arc<dyn LightBridge>)
                    .map_err(RunnerError::Bridge)
            })
            .transpose()
    }
}
