//! Minimal Philips Hue bridge adapter.
//!
//! Uses a pre-registered bridge username; discovery and pairing are left to
//! the bridge's own tooling.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::errors::LightError;
use crate::domain::models::{BridgeConfig, LightState};
use crate::domain::ports::{Light, LightBridge};

#[derive(Debug, Deserialize)]
struct HueLightInfo {
    name: String,
}

/// Body of `PUT /lights/{id}/state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HueLightCommand {
    pub on: bool,
    /// Hue wheel position, 0..=65535
    pub hue: u16,
    /// Saturation
    pub sat: u8,
    /// Brightness
    pub bri: u8,
}

impl HueLightCommand {
    /// Green for ok, yellow for claimed, red for alert.
    pub const fn for_state(state: LightState) -> Self {
        let hue = match state {
            LightState::Ok => 25_500,
            LightState::Claimed => 12_750,
            LightState::Alert => 0,
        };
        Self {
            on: true,
            hue,
            sat: 254,
            bri: 254,
        }
    }
}

/// HTTP client for one Hue bridge.
#[derive(Debug, Clone)]
pub struct HueBridge {
    http: Client,
    /// `{bridge}/api/{username}`
    api_base: String,
}

impl HueBridge {
    /// Client for the bridge at `config.url`. No request is made yet.
    pub fn new(config: &BridgeConfig) -> Result<Self, LightError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_base: format!(
                "{}/api/{}",
                config.url.trim_end_matches('/'),
                config.username
            ),
        })
    }
}

#[async_trait]
impl LightBridge for HueBridge {
    async fn lights(&self) -> Result<Vec<Arc<dyn Light>>, LightError> {
        let url = format!("{}/lights", self.api_base);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(LightError::Status {
                url,
                status: resp.status().as_u16(),
            });
        }

        let lights: BTreeMap<String, HueLightInfo> = resp.json().await?;
        debug!(count = lights.len(), "hue bridge lights enumerated");

        Ok(lights
            .into_iter()
            .map(|(id, info)| {
                Arc::new(HueLight {
                    http: self.http.clone(),
                    state_url: format!("{}/lights/{id}/state", self.api_base),
                    name: info.name,
                }) as Arc<dyn Light>
            })
            .collect())
    }
}

/// One light attached to a [`HueBridge`].
#[derive(Debug)]
pub struct HueLight {
    http: Client,
    state_url: String,
    name: String,
}

#[async_trait]
impl Light for HueLight {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_state(&self, state: LightState) -> Result<(), LightError> {
        let resp = self
            .http
            .put(&self.state_url)
            .json(&HueLightCommand::for_state(state))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(LightError::Status {
                url: self.state_url.clone(),
                status: resp.status().as_u16(),
            });
        }
        debug!(light = %self.name, %state, "hue light updated");
        Ok(())
    }
}
