//! Light ports - interfaces to physical or virtual indicator lights.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::LightError;
use crate::domain::models::LightState;

/// A name-addressable light.
#[async_trait]
pub trait Light: Send + Sync {
    fn name(&self) -> &str;

    async fn set_state(&self, state: LightState) -> Result<(), LightError>;
}

/// Source of the lights available for alerts.
#[async_trait]
pub trait LightBridge: Send + Sync {
    /// Enumerate every light the bridge currently knows about.
    async fn lights(&self) -> Result<Vec<Arc<dyn Light>>, LightError>;
}
