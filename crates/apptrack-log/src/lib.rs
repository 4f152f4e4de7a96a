//! Append-only usage log.
//!
//! Persists closed sessions and run summaries as CSV rows:
//!
//! ```text
//! Package,Start_Time,End_Time,Duration
//! com.example.mail,09:12:41,09:14:03,82s
//! TrackingSummary,09:12:30,09:20:00,450s
//! ```
//!
//! The log is append-only; rows are never mutated or deleted. A header row
//! is appended every time the sink is opened, so one header per tracking
//! run may recur mid-file — the read side skips them wherever they appear.
//! Every append flushes immediately: durability is preferred over
//! throughput.
//!
//! Clock times are formatted in UTC and carry no date; consumers that need
//! durations use the duration column, never a difference of clock times.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveTime, Utc};
use thiserror::Error;

use apptrack_core::LogRecord;

/// Fixed header row, also appended as the run-start marker on every open.
const HEADER: [&str; 4] = ["Package", "Start_Time", "End_Time", "Duration"];

/// Clock format used for the start/end columns.
const CLOCK_FORMAT: &str = "%H:%M:%S";

/// Usage log errors.
#[derive(Debug, Error)]
pub enum LogError {
    /// An error from the filesystem.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// An error from the CSV layer.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// The append-only CSV sink.
///
/// Exclusively owned by whichever worker is tracking; no other component
/// writes to it concurrently.
pub struct UsageLog {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl std::fmt::Debug for UsageLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageLog")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl UsageLog {
    /// Opens the log for appending, creating the file (and its parent
    /// directories) if needed, and appends the header row.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        writer.write_record(HEADER)?;
        writer.flush()?;

        tracing::debug!(path = %path.display(), "usage log opened");
        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }

    /// Appends one record and flushes immediately.
    pub fn append(&mut self, record: &LogRecord) -> Result<(), LogError> {
        let start = format_clock(record.started_at);
        let end = format_clock(record.ended_at);
        let duration = format!("{}s", record.duration_secs());
        self.writer.write_record([
            record.subject.as_str(),
            start.as_str(),
            end.as_str(),
            duration.as_str(),
        ])?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and releases the sink.
    pub fn finish(mut self) -> Result<(), LogError> {
        self.writer.flush()?;
        tracing::debug!(path = %self.path.display(), "usage log closed");
        Ok(())
    }

    /// The path the log writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn format_clock(at: DateTime<Utc>) -> String {
    at.format(CLOCK_FORMAT).to_string()
}

/// One data row read back from a usage log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRow {
    /// App ID, or the run-summary marker.
    pub subject: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub duration_secs: i64,
}

impl LoggedRow {
    /// Whether this row is a run summary rather than an app session.
    pub fn is_summary(&self) -> bool {
        self.subject == apptrack_core::SUMMARY_MARKER
    }
}

/// Reads every data row from a usage log.
///
/// Header rows (one per tracking run) are skipped wherever they appear;
/// rows that fail to parse are logged and skipped rather than failing the
/// whole read.
pub fn read_rows(path: &Path) -> Result<Vec<LoggedRow>, LogError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.iter().eq(HEADER) {
            continue;
        }
        match parse_row(&record) {
            Some(row) => rows.push(row),
            None => {
                tracing::warn!(row = ?record, "skipping malformed usage log row");
            }
        }
    }
    Ok(rows)
}

fn parse_row(record: &csv::StringRecord) -> Option<LoggedRow> {
    if record.len() != 4 {
        return None;
    }
    let subject = record.get(0)?.to_string();
    if subject.is_empty() {
        return None;
    }
    let start = NaiveTime::parse_from_str(record.get(1)?, CLOCK_FORMAT).ok()?;
    let end = NaiveTime::parse_from_str(record.get(2)?, CLOCK_FORMAT).ok()?;
    let duration_secs = record.get(3)?.strip_suffix('s')?.parse().ok()?;
    Some(LoggedRow {
        subject,
        start,
        end,
        duration_secs,
    })
}
