//! Tracking runtime for the app usage tracker.
//!
//! Realizes the single-worker execution model: one task owns the session
//! ledger, the usage log, and the run lifecycle. Lifecycle commands arrive
//! over a channel and interleave with periodic sampling ticks in a single
//! `select!` loop, so no two mutations ever run in parallel and no locks
//! are needed.

mod tracker;
mod worker;

pub use tracker::Tracker;
pub use worker::{Command, TrackerHandle, spawn};
