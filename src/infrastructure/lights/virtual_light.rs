//! Lights with no physical backing.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::domain::errors::LightError;
use crate::domain::models::{LightState, VirtualLightConfig};
use crate::domain::ports::{Light, LightBridge};

/// A name-only light that logs its state and remembers the last one.
#[derive(Debug)]
pub struct VirtualLight {
    name: String,
    debug_print: bool,
    state: Mutex<Option<LightState>>,
}

impl VirtualLight {
    /// Light that logs changes at info level when `debug_print` is set.
    pub fn new(name: impl Into<String>, debug_print: bool) -> Self {
        Self {
            name: name.into(),
            debug_print,
            state: Mutex::new(None),
        }
    }

    pub fn from_config(config: &VirtualLightConfig) -> Self {
        Self::new(config.name.clone(), config.debug)
    }

    /// Last state set, `None` before the first evaluation.
    pub fn state(&self) -> Option<LightState> {
        *self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Light for VirtualLight {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_state(&self, state: LightState) -> Result<(), LightError> {
        let previous = {
            let mut guard = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.replace(state)
        };

        if self.debug_print {
            info!(light = %self.name, %state, previous = ?previous, "virtual light");
        } else {
            debug!(light = %self.name, %state, previous = ?previous, "virtual light");
        }
        Ok(())
    }
}

/// Bridge over a fixed set of configured virtual lights.
#[derive(Debug, Default)]
pub struct VirtualBridge {
    lights: Vec<Arc<VirtualLight>>,
}

impl VirtualBridge {
    /// One virtual light per config entry, in order.
    pub fn new(configs: &[VirtualLightConfig]) -> Self {
        Self {
            lights: configs
                .iter()
                .map(|config| Arc::new(VirtualLight::from_config(config)))
                .collect(),
        }
    }
}

#[async_trait]
impl LightBridge for VirtualBridge {
    async fn lights(&self) -> Result<Vec<Arc<dyn Light>>, LightError> {
        Ok(self
            .lights
            .iter()
            .map(|light| Arc::clone(light) as Arc<dyn Light>)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_virtual_light_records_state() {
        let light = VirtualLight::new("desk", true);
        assert_eq!(light.state(), None);
        light.set_state(LightState::Alert).await.unwrap();
        light.set_state(LightState::Claimed).await.unwrap();
        assert_eq!(light.state(), Some(LightState::Claimed));
        assert_eq!(light.name(), "desk");
    }

    #[tokio::test]
    async fn test_virtual_bridge_lists_configured_lights() {
        let bridge = VirtualBridge::new(&[
            VirtualLightConfig {
                name: "a".to_string(),
                debug: false,
            },
            VirtualLightConfig {
                name: "b".to_string(),
                debug: true,
            },
        ]);
        let names: Vec<String> = bridge
            .lights()
            .await
            .unwrap()
            .iter()
            .map(|light| light.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
