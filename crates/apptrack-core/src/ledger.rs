//! Open-session bookkeeping.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::record::LogRecord;
use crate::types::AppId;

/// The ledger of currently-open application sessions.
///
/// Owns all open/close decisions. Each application has at most one open
/// session at a time; closing is idempotent, and sessions at or below the
/// minimum duration are discarded rather than recorded.
#[derive(Debug)]
pub struct SessionLedger {
    min_session_ms: i64,
    /// When each application's current session was opened.
    opened_at: HashMap<AppId, DateTime<Utc>>,
    /// The set of applications considered open.
    active: HashSet<AppId>,
}

impl SessionLedger {
    /// Creates an empty ledger discarding sessions of `min_session_ms` or less.
    #[must_use]
    pub fn new(min_session_ms: i64) -> Self {
        Self {
            min_session_ms,
            opened_at: HashMap::new(),
            active: HashSet::new(),
        }
    }

    /// Opens a session for `app` at `at`.
    ///
    /// If a session is already open for `app` the prior one is force-closed
    /// first (anomalous double-open, not an error); the returned record, if
    /// any, is that close. Out-of-order timestamps are tolerated by
    /// overwriting the recorded open time.
    pub fn open(&mut self, app: AppId, at: DateTime<Utc>) -> Option<LogRecord> {
        let prior = if self.active.contains(&app) {
            tracing::debug!(app = %app, "double open, force-closing prior session");
            self.close(&app, at)
        } else {
            None
        };

        tracing::debug!(app = %app, %at, "session opened");
        self.opened_at.insert(app.clone(), at);
        self.active.insert(app);
        prior
    }

    /// Closes the session for `app` at `at`, if one is open.
    ///
    /// Idempotent: closing an app with no open session is a no-op. The app
    /// leaves the open set regardless of whether a record is emitted; a
    /// record is emitted only when the duration strictly exceeds the
    /// minimum session threshold.
    pub fn close(&mut self, app: &AppId, at: DateTime<Utc>) -> Option<LogRecord> {
        self.active.remove(app);
        let opened = self.opened_at.remove(app)?;

        let duration_ms = (at - opened).num_milliseconds();
        if duration_ms <= self.min_session_ms {
            tracing::debug!(app = %app, duration_ms, "discarding sub-threshold session");
            return None;
        }

        tracing::debug!(app = %app, duration_ms, "session closed");
        Some(LogRecord::session(app.clone(), opened, at))
    }

    /// Closes every open session at `at`.
    pub fn close_all(&mut self, at: DateTime<Utc>) -> Vec<LogRecord> {
        let open: Vec<AppId> = self.active.iter().cloned().collect();
        open.iter().filter_map(|app| self.close(app, at)).collect()
    }

    /// Closes every open session NOT present in `detected`.
    ///
    /// `detected` is the full set of apps observed in the latest sampling
    /// window; any tracked-open app absent from it silently left the
    /// foreground without an explicit pause event.
    pub fn reconcile(&mut self, detected: &HashSet<AppId>, at: DateTime<Utc>) -> Vec<LogRecord> {
        let stale: Vec<AppId> = self.active.difference(detected).cloned().collect();
        stale
            .iter()
            .filter_map(|app| self.close(app, at))
            .collect()
    }

    /// Whether a session is currently open for `app`.
    pub fn is_open(&self, app: &AppId) -> bool {
        self.active.contains(app)
    }

    /// Whether an open time is recorded for `app`.
    ///
    /// Normally implied by [`is_open`](Self::is_open); can differ when state
    /// was only partially recovered (orphaned session).
    pub fn has_opened(&self, app: &AppId) -> bool {
        self.opened_at.contains_key(app)
    }

    /// Whether no sessions are open.
    pub fn open_set_is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of currently open sessions.
    pub fn open_count(&self) -> usize {
        self.active.len()
    }

    /// Records an open time without marking the app open.
    ///
    /// Test-only hook for constructing the orphaned state that the sampling
    /// fallback recovers from.
    #[cfg(test)]
    pub(crate) fn record_open_time(&mut self, app: AppId, at: DateTime<Utc>) {
        self.opened_at.insert(app, at);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .single()
            .expect("valid test timestamp")
            + Duration::seconds(secs)
    }

    fn app(id: &str) -> AppId {
        AppId::new(id).unwrap()
    }

    fn ledger() -> SessionLedger {
        SessionLedger::new(1_000)
    }

    #[test]
    fn open_then_close_emits_record() {
        let mut ledger = ledger();
        let mail = app("com.example.mail");

        assert!(ledger.open(mail.clone(), ts(0)).is_none());
        let record = ledger.close(&mail, ts(10)).expect("should emit");

        assert_eq!(record.subject.as_str(), "com.example.mail");
        assert_eq!(record.started_at, ts(0));
        assert_eq!(record.ended_at, ts(10));
        assert_eq!(record.duration_secs(), 10);
        assert!(!ledger.is_open(&mail));
    }

    #[test]
    fn close_is_idempotent() {
        let mut ledger = ledger();
        let mail = app("com.example.mail");

        ledger.open(mail.clone(), ts(0));
        assert!(ledger.close(&mail, ts(10)).is_some());
        assert!(ledger.close(&mail, ts(20)).is_none());
    }

    #[test]
    fn close_without_open_is_noop() {
        let mut ledger = ledger();
        assert!(ledger.close(&app("com.example.mail"), ts(5)).is_none());
        assert!(ledger.open_set_is_empty());
    }

    #[test]
    fn sub_threshold_sessions_are_discarded() {
        let mut ledger = ledger();
        let mail = app("com.example.mail");

        // Exactly at the threshold: discarded.
        ledger.open(mail.clone(), ts(0));
        assert!(ledger.close(&mail, ts(0) + Duration::milliseconds(1_000)).is_none());
        assert!(!ledger.is_open(&mail));

        // Just past the threshold: recorded.
        ledger.open(mail.clone(), ts(0));
        assert!(
            ledger
                .close(&mail, ts(0) + Duration::milliseconds(1_001))
                .is_some()
        );
    }

    #[test]
    fn out_of_order_close_is_discarded() {
        let mut ledger = ledger();
        let mail = app("com.example.mail");

        ledger.open(mail.clone(), ts(10));
        // Close timestamp before the open: negative duration, no record,
        // session still removed.
        assert!(ledger.close(&mail, ts(5)).is_none());
        assert!(!ledger.is_open(&mail));
    }

    #[test]
    fn double_open_force_closes_prior() {
        let mut ledger = ledger();
        let mail = app("com.example.mail");

        ledger.open(mail.clone(), ts(0));
        // Re-open 100ms later: the prior session is sub-threshold, so the
        // force-close emits nothing, but a fresh session starts at the new
        // timestamp.
        let prior = ledger.open(mail.clone(), ts(0) + Duration::milliseconds(100));
        assert!(prior.is_none());
        assert_eq!(ledger.open_count(), 1);

        let record = ledger.close(&mail, ts(10)).expect("should emit");
        assert_eq!(record.started_at, ts(0) + Duration::milliseconds(100));
    }

    #[test]
    fn double_open_emits_prior_when_long_enough() {
        let mut ledger = ledger();
        let mail = app("com.example.mail");

        ledger.open(mail.clone(), ts(0));
        let prior = ledger.open(mail.clone(), ts(30)).expect("should emit");
        assert_eq!(prior.started_at, ts(0));
        assert_eq!(prior.ended_at, ts(30));
        assert_eq!(ledger.open_count(), 1);
    }

    #[test]
    fn at_most_one_open_session_per_app() {
        let mut ledger = ledger();
        let mail = app("com.example.mail");

        for i in 0..5 {
            ledger.open(mail.clone(), ts(i * 10));
            assert_eq!(ledger.open_count(), 1);
        }
    }

    #[test]
    fn reconcile_closes_exactly_the_stale_set() {
        let mut ledger = ledger();
        let mail = app("com.example.mail");
        let maps = app("com.example.maps");
        let chat = app("com.example.chat");

        ledger.open(mail.clone(), ts(0));
        ledger.open(maps.clone(), ts(0));
        ledger.open(chat.clone(), ts(0));

        let detected = HashSet::from([mail.clone()]);
        let records = ledger.reconcile(&detected, ts(20));

        let mut closed: Vec<&str> = records.iter().map(|r| r.subject.as_str()).collect();
        closed.sort_unstable();
        assert_eq!(closed, ["com.example.chat", "com.example.maps"]);
        assert!(ledger.is_open(&mail));
        assert!(!ledger.is_open(&maps));
        assert!(!ledger.is_open(&chat));
    }

    #[test]
    fn reconcile_with_everything_detected_is_noop() {
        let mut ledger = ledger();
        let mail = app("com.example.mail");
        ledger.open(mail.clone(), ts(0));

        let detected = HashSet::from([mail.clone()]);
        assert!(ledger.reconcile(&detected, ts(20)).is_empty());
        assert!(ledger.is_open(&mail));
    }

    #[test]
    fn close_all_closes_everything() {
        let mut ledger = ledger();
        ledger.open(app("com.example.mail"), ts(0));
        ledger.open(app("com.example.maps"), ts(2));

        let records = ledger.close_all(ts(30));
        assert_eq!(records.len(), 2);
        assert!(ledger.open_set_is_empty());
    }

    #[test]
    fn close_all_skips_sub_threshold_but_empties_the_set() {
        let mut ledger = ledger();
        ledger.open(app("com.example.mail"), ts(0));
        ledger.open(app("com.example.maps"), ts(30) - Duration::milliseconds(500));

        let records = ledger.close_all(ts(30));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject.as_str(), "com.example.mail");
        assert!(ledger.open_set_is_empty());
    }
}
