//! Show which jobs a set of patterns resolves to.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::Path;

use crate::cli::display::{list_table, output, render_list, CommandOutput};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{Connector, HttpConnector, JobDirectory};

/// Arguments of `buildbeacon jobs`
#[derive(Args, Debug)]
pub struct JobsArgs {
    /// Job or view name patterns; all jobs when omitted
    pub patterns: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ResolvedJob {
    pattern: String,
    name: String,
    url: String,
}

#[derive(Debug, Serialize)]
struct JobsOutput {
    jobs: Vec<ResolvedJob>,
}

impl CommandOutput for JobsOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["pattern", "job", "url"]);
        for job in &self.jobs {
            table.add_row(vec![job.pattern.as_str(), job.name.as_str(), job.url.as_str()]);
        }
        render_list("job", &table, self.jobs.len())
    }
}

/// Resolve each pattern against the live directory and print the matches.
pub async fn execute(args: JobsArgs, config_path: &Path, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load_from_file(config_path)?;
    let fetcher = HttpConnector.fetcher(&config)?;
    let directory = JobDirectory::load(&config.jenkins.url, fetcher.as_ref()).await?;

    let patterns = if args.patterns.is_empty() {
        vec![".*".to_string()]
    } else {
        args.patterns
    };

    let mut jobs = Vec::new();
    for pattern in patterns {
        for job in directory.resolve(&pattern, fetcher.as_ref()).await? {
            jobs.push(ResolvedJob {
                pattern: pattern.clone(),
                name: job.name(fetcher.as_ref()).await?,
                url: job.url().to_string(),
            });
        }
    }

    output(&JobsOutput { jobs }, json_mode);
    Ok(())
}
