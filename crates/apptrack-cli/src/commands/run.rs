//! Run command: track usage until interrupted.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};

use apptrack_runtime::{Tracker, spawn};

use crate::config::Config;
use crate::source::JsonlEventSource;

/// Tracks usage from the configured JSONL event stream until ctrl-c.
pub fn run(config: &Config, events: Option<&Path>, log: Option<&Path>) -> Result<()> {
    let events_path = events
        .or(config.events_path.as_deref())
        .context("no event stream configured; pass --events or set events_path")?;
    let log_path = log.unwrap_or(&config.log_path);

    // One logical worker: lifecycle commands and sampling ticks are
    // serialized on a current-thread runtime.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(track(config, events_path, log_path))
}

async fn track(config: &Config, events_path: &Path, log_path: &Path) -> Result<()> {
    let source = JsonlEventSource::new(events_path);
    let self_foreground = Arc::new(AtomicBool::new(false));
    let tracker = Tracker::new(
        config.tracker.clone(),
        source,
        self_foreground,
        log_path.to_path_buf(),
    );

    let (handle, join) = spawn(tracker);
    handle.start();
    tracing::info!(
        events = %events_path.display(),
        log = %log_path.display(),
        "tracking; press ctrl-c to stop"
    );

    wait_for_shutdown(config, &handle).await?;

    handle.stop();
    drop(handle);
    join.await.context("tracker worker panicked")?;

    println!("Usage log written to {}", log_path.display());
    Ok(())
}

/// Blocks until ctrl-c. On unix, SIGUSR1 maps to the pause command: the
/// tracker's own session is closed while the run keeps going.
#[cfg(unix)]
async fn wait_for_shutdown(config: &Config, handle: &apptrack_runtime::TrackerHandle) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut pause_signal =
        signal(SignalKind::user_defined1()).context("failed to install SIGUSR1 handler")?;
    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for ctrl-c")?;
                return Ok(());
            }
            _ = pause_signal.recv() => {
                if let Some(app) = config.self_app_id() {
                    tracing::info!(app = %app, "pause requested");
                    handle.pause(app);
                } else {
                    tracing::warn!("pause requested but no self_app configured");
                }
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown(
    _config: &Config,
    _handle: &apptrack_runtime::TrackerHandle,
) -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    Ok(())
}
