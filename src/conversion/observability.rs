use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::ConversionError;

use super::parse::ParseMode;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConversionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (cells the user can choose to null out).
    Warning,
    /// Error-level event (the selection cannot be converted).
    Error,
    /// Critical error (the request itself is malformed).
    Critical,
}

/// Context about a conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionContext {
    /// Selected column names, as parsed from the request.
    pub columns: Vec<String>,
    /// Parse mode in effect.
    pub parse_mode: ParseMode,
}

impl fmt::Display for ConversionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mode={:?} columns={}", self.parse_mode, self.columns.join(","))
    }
}

/// Stats reported on successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionStats {
    /// Rows in the dataset.
    pub rows: usize,
    /// Distinct columns converted.
    pub columns: usize,
    /// Null cells across the converted columns.
    pub nulls: usize,
}

/// Observer interface for conversion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait ConversionObserver: Send + Sync {
    /// Called when conversion succeeds.
    fn on_success(&self, _ctx: &ConversionContext, _stats: ConversionStats) {}

    /// Called when conversion fails.
    fn on_failure(&self, _ctx: &ConversionContext, _severity: ConversionSeverity, _error: &ConversionError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ConversionObserver>>,
}

impl CompositeObserver {
    /// Fan out to `observers`, in order.
    pub fn new(observers: Vec<Arc<dyn ConversionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl ConversionObserver for CompositeObserver {
    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs conversion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl ConversionObserver for StdErrObserver {
    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        eprintln!("[to_datetime][ok] {ctx} rows={} nulls={}", stats.rows, stats.nulls);
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        eprintln!("[to_datetime][{severity:?}] {ctx} err={error}");
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        eprintln!("[ALERT][to_datetime][{severity:?}] {ctx} err={error}");
    }
}

/// Appends conversion events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Appends `{timestamp} {event}` as one write, so concurrent appends never interleave.
    fn append_line(&self, event: fmt::Arguments<'_>) {
        let line = format!("{} {event}\n", unix_ts());
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = f.write_all(line.as_bytes());
        }
    }
}

impl ConversionObserver for FileObserver {
    fn on_success(&self, ctx: &ConversionContext, stats: ConversionStats) {
        self.append_line(format_args!("ok {ctx} rows={} nulls={}", stats.rows, stats.nulls));
    }

    fn on_failure(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.append_line(format_args!("fail severity={severity:?} {ctx} err={error}"));
    }

    fn on_alert(&self, ctx: &ConversionContext, severity: ConversionSeverity, error: &ConversionError) {
        self.append_line(format_args!("ALERT severity={severity:?} {ctx} err={error}"));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
