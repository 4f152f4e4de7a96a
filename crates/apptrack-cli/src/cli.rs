//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Foreground application usage tracker.
///
/// Samples a foreground-transition event stream on a fixed period, keeps a
/// ledger of open application sessions, and appends closed sessions to an
/// append-only CSV usage log.
#[derive(Debug, Parser)]
#[command(name = "apptrack", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Track usage until interrupted, reading events from a JSONL file.
    Run {
        /// Event stream to follow (overrides the configured events_path).
        #[arg(long)]
        events: Option<PathBuf>,

        /// Usage log to append to (overrides the configured log_path).
        #[arg(long)]
        log: Option<PathBuf>,
    },

    /// Summarize per-app usage from a usage log.
    Report {
        /// Usage log to read (overrides the configured log_path).
        #[arg(long)]
        log: Option<PathBuf>,

        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}
