//! Command-line interface.

pub mod commands;
pub mod display;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{jobs::JobsArgs, run::RunArgs, tick::TickArgs};

/// Top-level command line
#[derive(Parser, Debug)]
#[command(name = "buildbeacon")]
#[command(about = "Buildbeacon - drive indicator lights from Jenkins job health", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "BUILDBEACON_CONFIG",
        default_value = "buildbeacon.yaml"
    )]
    pub config: PathBuf,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll the server and update lights until interrupted
    Run(RunArgs),

    /// Run a single poll and print every light state
    Tick(TickArgs),

    /// List the jobs that name patterns resolve to
    Jobs(JobsArgs),

    /// Check the configuration file and exit
    Validate,
}

/// Print the error chain and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": causes,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{}", display::action_failure(&format!("Error: {err}")));
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1)
}
