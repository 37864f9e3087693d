//! Common test utilities for integration tests
//!
//! An in-memory Jenkins, recording lights and a connector that wires them
//! into a runner.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Notify;

use buildbeacon::domain::models::{Config, LightState};
use buildbeacon::domain::ports::{Light, LightBridge, SnapshotFetcher};
use buildbeacon::services::{Connector, RunnerError};
use buildbeacon::{FetchError, LightError};

pub const SERVER_URL: &str = "http://ci.test/";

pub fn job_url(name: &str) -> String {
    format!("{SERVER_URL}job/{name}/")
}

pub fn view_url(name: &str) -> String {
    format!("{SERVER_URL}view/{name}/")
}

pub fn build_url(name: &str, number: u64) -> String {
    format!("{}{number}/", job_url(name))
}

/// Build history of one fake job
#[derive(Debug, Clone)]
pub struct FakeJob {
    pub name: String,
    pub url: String,
    pub builds: Vec<u64>,
    pub last_failed: Option<u64>,
    pub last_stable: Option<u64>,
    pub last_completed: Option<u64>,
    pub claimed: bool,
}

impl FakeJob {
    /// Ten builds, all stable
    pub fn stable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: job_url(name),
            builds: (1..=10).collect(),
            last_failed: None,
            last_stable: Some(10),
            last_completed: Some(10),
            claimed: false,
        }
    }

    /// Ten builds, the last `streak` of them failed
    pub fn failing(name: &str, streak: u64) -> Self {
        Self {
            last_failed: Some(10),
            last_stable: 10u64.checked_sub(streak).filter(|n| *n > 0),
            ..Self::stable(name)
        }
    }

    pub fn claimed(mut self) -> Self {
        self.claimed = true;
        self
    }

    fn job_document(&self) -> Value {
        let number = |n: Option<u64>| n.map_or(Value::Null, |n| json!({ "number": n }));
        json!({
            "name": self.name,
            "url": self.url,
            "builds": self.builds.iter().map(|n| json!({ "number": n })).collect::<Vec<_>>(),
            "lastFailedBuild": number(self.last_failed),
            "lastStableBuild": number(self.last_stable),
            "lastCompletedBuild": self.last_completed.map_or(Value::Null, |n| {
                json!({ "number": n, "url": build_url(&self.name, n) })
            }),
        })
    }

    fn build_document(&self, number: u64) -> Value {
        let actions = if self.claimed {
            json!([{}, { "claimed": true, "claimedBy": "alice" }])
        } else {
            json!([{}, { "claimed": false }])
        };
        json!({ "number": number, "actions": actions })
    }
}

#[derive(Debug, Default)]
struct ServerState {
    jobs: BTreeMap<String, FakeJob>,
    views: BTreeMap<String, Vec<String>>,
    failing_urls: HashSet<String>,
    gates: HashMap<String, Arc<Gate>>,
    calls: Vec<String>,
}

/// Holds fetches of one URL until released.
#[derive(Debug, Default)]
pub struct Gate {
    /// Signalled each time a fetch reaches the gate
    pub entered: Notify,
    /// Lets one waiting fetch through
    pub release: Notify,
}

/// In-memory CI server answering job, view and build documents.
///
/// Jobs are keyed by URL so a rename keeps the same URL.
#[derive(Debug, Default)]
pub struct FakeServer {
    state: Mutex<ServerState>,
}

impl FakeServer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ServerState> {
        self.state.lock().expect("fake server lock poisoned")
    }

    pub fn put_job(&self, job: FakeJob) {
        self.state().jobs.insert(job.url.clone(), job);
    }

    pub fn put_view(&self, name: &str, jobs: &[&str]) {
        self.state()
            .views
            .insert(name.to_string(), jobs.iter().map(ToString::to_string).collect());
    }

    /// Rename the job at `url` in both the listing and its own document.
    pub fn rename_job(&self, url: &str, new_name: &str) {
        if let Some(job) = self.state().jobs.get_mut(url) {
            job.name = new_name.to_string();
        }
    }

    /// Make every fetch of `url` fail as if retries were exhausted.
    pub fn fail_url(&self, url: &str) {
        self.state().failing_urls.insert(url.to_string());
    }

    pub fn heal_url(&self, url: &str) {
        self.state().failing_urls.remove(url);
    }

    /// Park every fetch of `url` until the returned gate is released.
    pub fn gate_url(&self, url: &str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.state().gates.insert(url.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.state().calls.iter().filter(|call| *call == url).count()
    }

    fn document(state: &ServerState, url: &str) -> Option<Value> {
        if url == SERVER_URL {
            let jobs: Vec<Value> = state
                .jobs
                .values()
                .map(|job| json!({ "name": job.name, "url": job.url }))
                .collect();
            let views: Vec<Value> = state
                .views
                .keys()
                .map(|name| json!({ "name": name, "url": view_url(name) }))
                .collect();
            return Some(json!({ "jobs": jobs, "views": views }));
        }

        if let Some(job) = state.jobs.get(url) {
            return Some(job.job_document());
        }

        if let Some((_, names)) = state.views.iter().find(|(name, _)| view_url(name) == url) {
            let jobs: Vec<Value> = names.iter().map(|name| json!({ "name": name })).collect();
            return Some(json!({ "jobs": jobs }));
        }

        state.jobs.values().find_map(|job| {
            job.last_completed
                .filter(|n| build_url(&job.name, *n) == url)
                .map(|n| job.build_document(n))
        })
    }
}

#[async_trait]
impl SnapshotFetcher for FakeServer {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let gate = {
            let mut state = self.state();
            state.calls.push(url.to_string());
            state.gates.get(url).cloned()
        };
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let state = self.state();
        if state.failing_urls.contains(url) {
            return Err(exhausted(url, "connection refused"));
        }
        Self::document(&state, url).ok_or_else(|| exhausted(url, "404 Not Found"))
    }
}

pub fn exhausted(url: &str, last_error: &str) -> FetchError {
    FetchError::Exhausted {
        url: url.to_string(),
        attempts: 10,
        last_error: last_error.to_string(),
    }
}

/// A light that remembers every state it was set to.
#[derive(Debug)]
pub struct RecordingLight {
    name: String,
    states: Mutex<Vec<LightState>>,
    broken: AtomicBool,
}

impl RecordingLight {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            states: Mutex::new(Vec::new()),
            broken: AtomicBool::new(false),
        })
    }

    pub fn states(&self) -> Vec<LightState> {
        self.states.lock().expect("light lock poisoned").clone()
    }

    pub fn last(&self) -> Option<LightState> {
        self.states().last().copied()
    }

    pub fn break_bridge(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Light for RecordingLight {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_state(&self, state: LightState) -> Result<(), LightError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(LightError::Bridge(format!("{} is unreachable", self.name)));
        }
        self.states.lock().expect("light lock poisoned").push(state);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeBridge {
    lights: Vec<Arc<RecordingLight>>,
}

impl FakeBridge {
    pub fn with_lights(lights: &[Arc<RecordingLight>]) -> Arc<Self> {
        Arc::new(Self {
            lights: lights.to_vec(),
        })
    }
}

#[async_trait]
impl LightBridge for FakeBridge {
    async fn lights(&self) -> Result<Vec<Arc<dyn Light>>, LightError> {
        Ok(self
            .lights
            .iter()
            .map(|light| Arc::clone(light) as Arc<dyn Light>)
            .collect())
    }
}

/// Hands the same fake server and bridge to every composition.
pub struct FakeConnector {
    pub server: Arc<FakeServer>,
    pub bridge: Option<Arc<FakeBridge>>,
}

impl FakeConnector {
    pub fn new(server: &Arc<FakeServer>, bridge: Option<Arc<FakeBridge>>) -> Arc<Self> {
        Arc::new(Self {
            server: Arc::clone(server),
            bridge,
        })
    }
}

impl Connector for FakeConnector {
    fn fetcher(&self, _config: &Config) -> Result<Arc<dyn SnapshotFetcher>, RunnerError> {
        Ok(Arc::clone(&self.server) as Arc<dyn SnapshotFetcher>)
    }

    fn bridge(&self, _config: &Config) -> Result<Option<Arc<dyn LightBridge>>, RunnerError> {
        Ok(self
            .bridge
            .as_ref()
            .map(|bridge| Arc::clone(bridge) as Arc<dyn LightBridge>))
    }
}

/// Write `yaml` to `buildbeacon.yaml` in a fresh temp directory.
pub fn write_config(yaml: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("buildbeacon.yaml");
    std::fs::write(&path, yaml).expect("Failed to write config");
    (dir, path)
}

/// Config header pointing at the fake server.
pub fn config_with_alerts(alerts: &str) -> String {
    format!("jenkins:\n  url: \"{SERVER_URL}\"\nalerts:\n{alerts}")
}

/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Map of light name to the state a tick reported for it
pub fn states_by_light(report: &buildbeacon::TickReport) -> HashMap<String, LightState> {
    report
        .alerts
        .iter()
        .map(|alert| (alert.light.clone(), alert.state))
        .collect()
}
