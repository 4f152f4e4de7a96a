//! The seam through which platform event streams are injected.

use chrono::{DateTime, Utc};

use crate::event::UsageEvent;
use crate::types::AppId;

/// Supplier of foreground transition events for a queried time window.
///
/// Implementations wrap whatever the platform offers: an OS usage-stats
/// query, a file appended by an external collector, or a scripted fixture
/// in tests. Both methods are best-effort; the sampling cycle is designed
/// to stay correct when events are missing or duplicated.
pub trait EventSource {
    /// Events in the half-open window `[from, to)`, oldest first.
    fn events_between(&mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<UsageEvent>;

    /// Best-effort fallback signal: the application most recently observed
    /// in the foreground, or `None` when the source cannot tell.
    fn most_recent_foreground(&mut self) -> Option<AppId>;
}
