//! One sampling cycle of the tracking loop.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::config::TrackerConfig;
use crate::event::TransitionKind;
use crate::ledger::SessionLedger;
use crate::record::LogRecord;
use crate::source::EventSource;
use crate::types::AppId;

/// Performs one sampling cycle at `now`.
///
/// Queries `source` for events in the window `[now - sample_window, now)`,
/// feeds them to the ledger, and reconciles the open set against the apps
/// observed this cycle. When the window yields no qualifying events, the
/// fallback ladder decides whether anything may be closed:
///
/// 1. `self_foreground` set — the tracking application itself is frontmost,
///    which explains the silence; nothing is closed.
/// 2. The fallback signal names a non-system app while sessions are open —
///    inconclusive, nothing is closed.
/// 3. The fallback signal names a non-system app, no sessions are open, but
///    an open time is still recorded for it — an orphaned session from a
///    missed resume/pause pairing; that one session is force-closed.
/// 4. Otherwise, nothing happens this cycle.
///
/// Apps in the configured system-package set are never opened, closed, or
/// reported. Returns the records emitted by every close performed.
pub fn sample_window<S: EventSource + ?Sized>(
    ledger: &mut SessionLedger,
    config: &TrackerConfig,
    source: &mut S,
    self_foreground: bool,
    now: DateTime<Utc>,
) -> Vec<LogRecord> {
    let events = source.events_between(now - config.sample_window(), now);

    let mut records = Vec::new();
    let mut detected: HashSet<AppId> = HashSet::new();

    for event in events {
        if config.is_system(&event.app) {
            continue;
        }
        detected.insert(event.app.clone());

        match event.kind {
            TransitionKind::Resumed => {
                records.extend(ledger.open(event.app, event.timestamp));
            }
            TransitionKind::Paused => {
                records.extend(ledger.close(&event.app, event.timestamp));
            }
        }
    }

    if !detected.is_empty() {
        // Anything tracked-open that dropped out of the window left the
        // foreground without an explicit pause event.
        records.extend(ledger.reconcile(&detected, now));
        return records;
    }

    if self_foreground {
        tracing::debug!("no events; tracker app is frontmost, skipping cycle");
        return records;
    }

    match source.most_recent_foreground() {
        Some(app) if !config.is_system(&app) => {
            if ledger.open_set_is_empty() {
                if ledger.has_opened(&app) {
                    tracing::debug!(app = %app, "fallback: force-closing orphaned session");
                    records.extend(ledger.close(&app, now));
                }
            } else {
                tracing::debug!(app = %app, "fallback app still frontmost, skipping close");
            }
        }
        _ => {}
    }

    records
}
