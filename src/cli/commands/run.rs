//! Poll forever, restarting on SIGHUP.

use anyhow::Result;
use clap::Args;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::services::{HttpConnector, Runner};

/// Arguments of `buildbeacon run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Create a virtual light for every configured light that does not exist
    #[arg(long)]
    pub create_missing_lights: bool,
}

/// Start the runner and poll until ctrl-c.
pub async fn execute(args: RunArgs, config_path: &Path, _json_mode: bool) -> Result<()> {
    let runner = Runner::start(config_path, Arc::new(HttpConnector), args.create_missing_lights).await?;

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let (restart_tx, restart_rx) = mpsc::channel(1);

    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = ctrl_c_tx.send(());
            }
            Err(err) => warn!(error = %err, "cannot listen for ctrl-c"),
        }
    });
    spawn_restart_listener(restart_tx);

    info!(config = %config_path.display(), "polling");
    let result = runner.run(shutdown_rx, restart_rx).await;
    drop(shutdown_tx);
    Ok(result?)
}

#[cfg(unix)]
fn spawn_restart_listener(restart_tx: mpsc::Sender<()>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(hangup) => hangup,
            Err(err) => {
                warn!(error = %err, "cannot listen for SIGHUP");
                return;
            }
        };
        while hangup.recv().await.is_some() {
            info!("SIGHUP received, scheduling restart");
            if restart_tx.send(()).await.is_err() {
                break;
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_restart_listener(restart_tx: mpsc::Sender<()>) {
    // Keep the channel open; restarts then only happen on schedule.
    tokio::spawn(async move {
        restart_tx.closed().await;
    });
}
