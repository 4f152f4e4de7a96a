//! Records appended to the durable usage log.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::types::AppId;

/// Subject literal used for run-summary rows.
pub const SUMMARY_MARKER: &str = "TrackingSummary";

/// What a log record describes: one application session or a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// A closed session for one application.
    App(AppId),
    /// The summary row written when a tracking run stops.
    RunSummary,
}

impl Subject {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::App(app) => app.as_str(),
            Self::RunSummary => SUMMARY_MARKER,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the usage log: a closed session or a run summary, flattened
/// to (subject, start, end).
///
/// Records are immutable once produced; the log they land in is append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub subject: Subject,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl LogRecord {
    /// A closed-session record for one application.
    pub const fn session(app: AppId, started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Self {
        Self {
            subject: Subject::App(app),
            started_at,
            ended_at,
        }
    }

    /// The run-summary record covering a whole tracking run.
    pub const fn summary(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Self {
        Self {
            subject: Subject::RunSummary,
            started_at,
            ended_at,
        }
    }

    /// Whole seconds between start and end.
    #[must_use]
    pub fn duration_secs(&self) -> i64 {
        (self.ended_at - self.started_at).num_seconds()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn duration_is_whole_seconds() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let end = start + chrono::Duration::milliseconds(10_500);
        let record = LogRecord::session(AppId::new("com.example.mail").unwrap(), start, end);
        assert_eq!(record.duration_secs(), 10);
    }

    #[test]
    fn summary_uses_marker_subject() {
        let start = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let record = LogRecord::summary(start, start + chrono::Duration::seconds(60));
        assert_eq!(record.subject.as_str(), SUMMARY_MARKER);
        assert_eq!(record.duration_secs(), 60);
    }
}
