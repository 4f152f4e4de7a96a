//! Core domain logic for the app usage tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Session bookkeeping: the ledger of currently-open application sessions
//! - Sampling: folding one window of foreground/background events into the ledger
//! - The `EventSource` seam through which platform event streams are injected

mod config;
mod cycle;
mod event;
mod ledger;
mod record;
mod source;
mod types;

pub use config::TrackerConfig;
pub use cycle::sample_window;
pub use event::{TransitionKind, UnknownTransition, UsageEvent};
pub use ledger::SessionLedger;
pub use record::{LogRecord, SUMMARY_MARKER, Subject};
pub use source::EventSource;
pub use types::{AppId, ValidationError};
