//! The single-worker task that serializes lifecycle commands and ticks.

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use apptrack_core::{AppId, EventSource};

use crate::tracker::Tracker;

/// Lifecycle commands accepted by the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Begin a tracking run.
    Start,
    /// End the current tracking run.
    Stop,
    /// Close only the given app's session (the tracking application itself
    /// losing focus).
    Pause { app: AppId },
}

/// Handle for sending lifecycle commands to a spawned tracker worker.
///
/// Dropping the last handle closes the channel; the worker then performs a
/// final stop (closing all open sessions and the sink) and exits.
#[derive(Debug, Clone)]
pub struct TrackerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl TrackerHandle {
    pub fn start(&self) {
        self.send(Command::Start);
    }

    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    pub fn pause(&self, app: AppId) {
        self.send(Command::Pause { app });
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            tracing::warn!("tracker worker is gone, dropping command");
        }
    }
}

/// Spawns the worker task owning `tracker`.
///
/// The returned handle is the only way to reach the tracker; the join
/// handle resolves once the channel closes and the final stop has run.
pub fn spawn<S>(tracker: Tracker<S>) -> (TrackerHandle, JoinHandle<()>)
where
    S: EventSource + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let join = tokio::spawn(run_worker(tracker, rx));
    (TrackerHandle { tx }, join)
}

async fn run_worker<S: EventSource + Send>(
    mut tracker: Tracker<S>,
    mut rx: mpsc::UnboundedReceiver<Command>,
) {
    // Present only while a run is active; stopping drops it, cancelling the
    // pending reschedule.
    let mut ticker: Option<Interval> = None;

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Start) => {
                    match tracker.start(Utc::now()) {
                        Ok(()) if tracker.is_running() && ticker.is_none() => {
                            let mut interval = tokio::time::interval(tracker.sample_period());
                            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                            ticker = Some(interval);
                        }
                        Ok(()) => {}
                        Err(error) => {
                            tracing::error!(%error, "failed to open usage log, staying idle");
                        }
                    }
                }
                Some(Command::Stop) => {
                    tracker.stop(Utc::now());
                    ticker = None;
                }
                Some(Command::Pause { app }) => {
                    tracker.pause(&app, Utc::now());
                }
                None => {
                    tracker.stop(Utc::now());
                    break;
                }
            },
            () = next_tick(ticker.as_mut()) => {
                tracker.tick(Utc::now());
            }
        }
    }
}

/// Awaits the next tick, or forever when no run is active.
async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
