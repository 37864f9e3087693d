//! Validate a configuration file without contacting any server.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::cli::display::{action_success, list_table, output, CommandOutput};
use crate::domain::models::UnknownHealthPolicy;
use crate::infrastructure::config::ConfigLoader;

#[derive(Debug, Serialize)]
struct AlertSummary {
    light: String,
    patterns: Vec<String>,
    tolerated_failures: u64,
    ignored: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    path: String,
    server: String,
    unknown_health: UnknownHealthPolicy,
    virtual_lights: Vec<String>,
    alerts: Vec<AlertSummary>,
}

impl CommandOutput for ValidateOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["light", "watches", "tolerates", "ignores"]);
        for alert in &self.alerts {
            table.add_row(vec![
                alert.light.clone(),
                alert.patterns.join(", "),
                alert.tolerated_failures.to_string(),
                alert.ignored.join(", "),
            ]);
        }
        format!(
            "{}\nserver: {}\nvirtual lights: {}\n{table}",
            action_success(&format!("{} is valid", self.path)),
            self.server,
            if self.virtual_lights.is_empty() {
                "none".to_string()
            } else {
                self.virtual_lights.join(", ")
            },
        )
    }
}

/// Load and validate the configuration, then print what it drives.
pub fn execute(config_path: &Path, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load_from_file(config_path)?;
    let summary = ValidateOutput {
        path: config_path.display().to_string(),
        server: config.jenkins.url.clone(),
        unknown_health: config.health.unknown,
        virtual_lights: config.virtual_lights.iter().map(|l| l.name.clone()).collect(),
        alerts: config
            .alerts
            .iter()
            .map(|alert| AlertSummary {
                light: alert.light.clone(),
                patterns: alert.jobs_to_watch.clone(),
                tolerated_failures: alert.num_ignored_fails,
                ignored: alert.jobs_to_ignore.clone(),
            })
            .collect(),
    };
    output(&summary, json_mode);
    Ok(())
}
