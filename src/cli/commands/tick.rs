//! Run a single evaluation pass and print the light states.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::cli::display::{colorize_state, colorize_verdict, list_table, output, CommandOutput};
use crate::services::{HttpConnector, Runner, TickReport};

/// Arguments of `buildbeacon tick`
#[derive(Args, Debug)]
pub struct TickArgs {
    /// Create a virtual light for every configured light that does not exist
    #[arg(long)]
    pub create_missing_lights: bool,

    /// List every job verdict, not just the failing ones
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Serialize)]
struct TickOutput {
    #[serde(flatten)]
    report: TickReport,
    #[serde(skip)]
    verbose: bool,
}

impl CommandOutput for TickOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["light", "state", "job", "verdict"]);
        for alert in &self.report.alerts {
            let shown: Vec<_> = alert
                .verdicts
                .iter()
                .filter(|v| self.verbose || !v.ok)
                .collect();
            if shown.is_empty() {
                table.add_row(vec![
                    alert.light.clone(),
                    colorize_state(alert.state).to_string(),
                    String::new(),
                    String::new(),
                ]);
            }
            for (i, verdict) in shown.into_iter().enumerate() {
                let (light, state) = if i == 0 {
                    (alert.light.clone(), colorize_state(alert.state).to_string())
                } else {
                    (String::new(), String::new())
                };
                table.add_row(vec![
                    light,
                    state,
                    verdict.name.clone(),
                    colorize_verdict(verdict.ok, verdict.claimed).to_string(),
                ]);
            }
        }

        let mut lines = vec![table.to_string()];
        for (light, error) in &self.report.light_failures {
            lines.push(crate::cli::display::action_failure(&format!("{light}: {error}")));
        }
        lines.push(format!(
            "{} jobs updated, {} with missing data",
            self.report.jobs_updated, self.report.jobs_with_missing_data
        ));
        lines.join("\n")
    }
}

pub async fn execute(args: TickArgs, config_path: &Path, json_mode: bool) -> Result<()> {
    let runner = Runner::start(config_path, Arc::new(HttpConnector), args.create_missing_lights).await?;
    let report = runner.tick().await?;
    output(
        &TickOutput {
            report,
            verbose: args.verbose,
        },
        json_mode,
    );
    Ok(())
}
