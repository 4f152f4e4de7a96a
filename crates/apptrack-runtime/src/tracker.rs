//! Run lifecycle and per-tick sampling.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use apptrack_core::{AppId, EventSource, LogRecord, SessionLedger, TrackerConfig, sample_window};
use apptrack_log::{LogError, UsageLog};

/// Lifecycle state of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Running { started_at: DateTime<Utc> },
}

/// The tracking controller: owns the ledger, the sink, and the run state.
///
/// All methods take `now` explicitly; the worker passes the wall clock,
/// tests pass fixed timestamps. Append failures are logged and swallowed —
/// ledger state still transitions, per the availability-first error policy.
#[derive(Debug)]
pub struct Tracker<S> {
    config: TrackerConfig,
    source: S,
    self_foreground: Arc<AtomicBool>,
    log_path: PathBuf,
    ledger: SessionLedger,
    state: RunState,
    log: Option<UsageLog>,
}

impl<S: EventSource> Tracker<S> {
    /// Creates an idle tracker.
    ///
    /// `self_foreground` is the externally-mutated flag that is set while
    /// the tracking application itself is frontmost; the tracker only ever
    /// reads it.
    pub fn new(
        config: TrackerConfig,
        source: S,
        self_foreground: Arc<AtomicBool>,
        log_path: PathBuf,
    ) -> Self {
        let ledger = SessionLedger::new(config.min_session_ms);
        Self {
            config,
            source,
            self_foreground,
            log_path,
            ledger,
            state: RunState::Idle,
            log: None,
        }
    }

    /// Whether a tracking run is active.
    pub const fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running { .. })
    }

    /// The sampling period.
    pub fn sample_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.config.sample_window_ms.max(1).unsigned_abs())
    }

    /// Starts a tracking run: opens the sink (appending the header row that
    /// marks the run start) and records the run start time.
    ///
    /// No-op when already running. Failing to open the sink leaves the
    /// tracker idle.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), LogError> {
        if self.is_running() {
            tracing::debug!("start ignored, already tracking");
            return Ok(());
        }

        let log = UsageLog::open(&self.log_path)?;
        tracing::info!(path = %log.path().display(), "tracking started");
        self.log = Some(log);
        self.state = RunState::Running { started_at: now };
        Ok(())
    }

    /// Stops the current run: closes every open session, appends the run
    /// summary, and releases the sink. No-op when idle.
    pub fn stop(&mut self, now: DateTime<Utc>) {
        let RunState::Running { started_at } = self.state else {
            tracing::debug!("stop ignored, not tracking");
            return;
        };

        for record in self.ledger.close_all(now) {
            self.append(&record);
        }

        let summary = LogRecord::summary(started_at, now);
        tracing::info!(duration_secs = summary.duration_secs(), "tracking stopped");
        self.append(&summary);

        if let Some(log) = self.log.take() {
            if let Err(error) = log.finish() {
                tracing::warn!(%error, "failed to close usage log");
            }
        }
        self.state = RunState::Idle;
    }

    /// Closes only `app`'s session, if open. Used when the tracking
    /// application itself leaves the foreground; the run keeps going.
    pub fn pause(&mut self, app: &AppId, now: DateTime<Utc>) {
        if let Some(record) = self.ledger.close(app, now) {
            self.append(&record);
        }
    }

    /// One sampling cycle. Does nothing while idle.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if !self.is_running() {
            return;
        }

        let self_foreground = self.self_foreground.load(Ordering::Relaxed);
        let records = sample_window(
            &mut self.ledger,
            &self.config,
            &mut self.source,
            self_foreground,
            now,
        );
        for record in records {
            self.append(&record);
        }
    }

    fn append(&mut self, record: &LogRecord) {
        let Some(log) = &mut self.log else {
            return;
        };
        if let Err(error) = log.append(record) {
            tracing::warn!(subject = %record.subject, %error, "failed to append usage record");
        }
    }
}
