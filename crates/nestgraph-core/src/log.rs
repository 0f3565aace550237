//! Log records and sinks.
//!
//! Construction never returns an error to the caller. Every decision point
//! instead emits a [`LogRecord`] tagged with the dotted path of the node (and
//! the directive index, e.g. `"1.2 c.0"`) through a [`LogSink`].
//!
//! - [`TracingSink`] (default): forwards records as `tracing` events
//! - [`MemorySink`]: keeps records in memory for inspection

use parking_lot::Mutex;
use std::fmt;

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structured log record.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub level: LogLevel,
    /// Node path plus optional directive tag, e.g. `"1.2 a.3"`.
    pub path: String,
    pub text: String,
}

impl LogRecord {
    pub fn new(level: LogLevel, path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            path: path.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:  {} - {}", self.path, self.level, self.text)
    }
}

/// Receiver for log records.
///
/// The composer never inspects anything a sink does with a record.
pub trait LogSink: Send + Sync {
    fn record(&self, record: LogRecord);
}

/// Forwards records to `tracing` under the `nestgraph` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn record(&self, record: LogRecord) {
        let LogRecord { level, path, text } = record;
        match level {
            LogLevel::Trace => tracing::trace!(target: "nestgraph", path = %path, "{}", text),
            LogLevel::Debug => tracing::debug!(target: "nestgraph", path = %path, "{}", text),
            LogLevel::Info => tracing::info!(target: "nestgraph", path = %path, "{}", text),
            LogLevel::Warn => tracing::warn!(target: "nestgraph", path = %path, "{}", text),
            LogLevel::Error => tracing::error!(target: "nestgraph", path = %path, "{}", text),
        }
    }
}

/// Collects records in memory.
///
/// # Example
/// ```
/// use nestgraph_core::{LogLevel, LogRecord, LogSink, MemorySink};
///
/// let sink = MemorySink::new();
/// sink.record(LogRecord::new(LogLevel::Error, "1", "template osc not found in library"));
/// assert!(sink.contains(LogLevel::Error, "not found"));
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record received so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    pub fn at_level(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .cloned()
            .collect()
    }

    pub fn errors(&self) -> Vec<LogRecord> {
        self.at_level(LogLevel::Error)
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.records.lock().iter().filter(|r| r.level == level).count()
    }

    /// True if a record at `level` contains `needle` in its text.
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.records
            .lock()
            .iter()
            .any(|r| r.level == level && r.text.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogSink for MemorySink {
    fn record(&self, record: LogRecord) {
        self.records.lock().push(record);
    }
}
