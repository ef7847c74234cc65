//! Structured logger for the store
//!
//! - Explicit severity levels
//! - One log line = one event, with key/value fields
//! - Deterministic field ordering (alphabetical by key)
//! - Injected into the store, never a process-wide singleton

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing_subscriber::EnvFilter;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Per entity and attribute detail
    Trace = 0,
    /// Lifecycle detail
    Debug = 1,
    /// Normal operations
    Info = 2,
    /// Recoverable issues
    Warn = 3,
    /// Operation failures
    Error = 4,
}

impl LogLevel {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sink for store log events.
pub trait Logger: Send + Sync {
    /// Log an event with the given level and fields
    fn log(&self, level: LogLevel, event: &str, fields: &[(&str, &str)]);

    /// Log at TRACE level
    fn trace(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(LogLevel::Trace, event, fields);
    }

    /// Log at DEBUG level
    fn debug(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(LogLevel::Debug, event, fields);
    }

    /// Log at INFO level
    fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(LogLevel::Info, event, fields);
    }

    /// Log at WARN level
    fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(LogLevel::Warn, event, fields);
    }

    /// Log at ERROR level
    fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(LogLevel::Error, event, fields);
    }
}

/// Renders fields as `key=value` pairs sorted by key.
fn render_fields(fields: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = fields.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);
    sorted
        .iter()
        .map(|(key, value)| format!("{}={:?}", key, value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Default logger, forwards every event to `tracing` under the `docstore` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, event: &str, fields: &[(&str, &str)]) {
        let fields = render_fields(fields);
        match level {
            LogLevel::Trace => tracing::trace!(target: "docstore", "{} {}", event, fields),
            LogLevel::Debug => tracing::debug!(target: "docstore", "{} {}", event, fields),
            LogLevel::Info => tracing::info!(target: "docstore", "{} {}", event, fields),
            LogLevel::Warn => tracing::warn!(target: "docstore", "{} {}", event, fields),
            LogLevel::Error => tracing::error!(target: "docstore", "{} {}", event, fields),
        }
    }
}

/// Logger that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLogger;

impl Logger for NoLogger {
    fn log(&self, _level: LogLevel, _event: &str, _fields: &[(&str, &str)]) {}
}

/// One captured log event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub event: String,
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    /// Returns the value of a field
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Logger that keeps every event in memory, for tests and diagnostics.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every captured event
    pub fn records(&self) -> Vec<LogRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the captured events with the given name
    pub fn events(&self, event: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.event == event)
            .collect()
    }

    /// Returns the captured events at the given level
    pub fn at_level(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.level == level)
            .collect()
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogLevel, event: &str, fields: &[(&str, &str)]) {
        let record = LogRecord {
            level,
            event: event.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}

/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG` (default `info`).
///
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
