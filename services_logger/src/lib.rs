//! # Logger Service
//!
//! This crate implements structured logging for the filesystem adapter.
//!
//! ## Philosophy
//!
//! Logging is explicit and structured, not text-based or printf-style.
//! Components never print; they hand `LogEntry` values to a `LogSink` the
//! host chose.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// A structured log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Log level
    pub level: LogLevel,
    /// Emitting component (e.g. "fs")
    pub source: Option<String>,
    /// Log message
    pub message: String,
    /// Structured fields
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Creates a new log entry
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            source: None,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Sets the source component
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds a field to the log entry
    pub fn with_field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.fields.push((key.into(), value.to_string()));
        self
    }

    /// Looks up a field value by key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.level)?;
        if let Some(source) = &self.source {
            write!(f, " {}:", source)?;
        }
        write!(f, " {}", self.message)?;
        for (key, value) in &self.fields {
            write!(f, " {}={}", key, value)?;
        }
        Ok(())
    }
}

/// Destination for log entries
pub trait LogSink {
    /// Records one entry
    fn log(&self, entry: LogEntry);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl LogSink for NullLog {
    fn log(&self, _entry: LogEntry) {}
}

/// Bounded in-memory log
///
/// Clones share the same buffer, so a test can keep one handle and give the
/// other to the component under test. Oldest entries are dropped first.
#[derive(Debug, Clone)]
pub struct MemoryLog {
    entries: Rc<RefCell<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl MemoryLog {
    /// Default number of retained entries
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Rc::new(RefCell::new(VecDeque::new())),
            capacity,
        }
    }

    /// Snapshot of retained entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().iter().cloned().collect()
    }

    /// Entries at or above `level`
    pub fn at_least(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level >= level)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Default for MemoryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for MemoryLog {
    fn log(&self, entry: LogEntry) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.borrow_mut();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}

/// Writes entries at or above a threshold to stderr
#[derive(Debug, Clone, Copy)]
pub struct StderrLog {
    threshold: LogLevel,
}

impl StderrLog {
    pub fn new(threshold: LogLevel) -> Self {
        Self { threshold }
    }
}

impl LogSink for StderrLog {
    fn log(&self, entry: LogEntry) {
        if entry.level >= self.threshold {
            eprintln!("{}", entry);
        }
    }
}

impl<T: LogSink + ?Sized> LogSink for Box<T> {
    fn log(&self, entry: LogEntry) {
        (**self).log(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_entry_creation() {
        let entry = LogEntry::new(LogLevel::Info, "test message");
        assert_eq!(entry.level, LogLevel::Info);
        assert_eq!(entry.message, "test message");
        assert!(entry.source.is_none());
        assert!(entry.fields.is_empty());
    }

    #[test]
    fn test_log_entry_with_fields() {
        let entry = LogEntry::new(LogLevel::Warn, "lseek failed")
            .with_source("fs")
            .with_field("path", "/a")
            .with_field("offset", 12);

        assert_eq!(entry.fields.len(), 2);
        assert_eq!(entry.field("path"), Some("/a"));
        assert_eq!(entry.field("offset"), Some("12"));
        assert_eq!(entry.field("missing"), None);
        assert_eq!(entry.to_string(), "[WARN] fs: lseek failed path=/a offset=12");
    }

    #[test]
    fn test_memory_log_shared_between_clones() {
        let log = MemoryLog::new();
        let handle = log.clone();
        handle.log(LogEntry::new(LogLevel::Debug, "one"));
        handle.log(LogEntry::new(LogLevel::Error, "two"));

        assert_eq!(log.len(), 2);
        assert_eq!(log.at_least(LogLevel::Warn).len(), 1);
        log.clear();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_memory_log_bounded() {
        let log = MemoryLog::with_capacity(2);
        for i in 0..5 {
            log.log(LogEntry::new(LogLevel::Info, format!("entry {}", i)));
        }
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "entry 3");
        assert_eq!(entries[1].message, "entry 4");
    }

    #[test]
    fn test_boxed_sink() {
        let log = MemoryLog::new();
        let boxed: Box<dyn LogSink> = Box::new(log.clone());
        boxed.log(LogEntry::new(LogLevel::Info, "via box"));
        assert_eq!(log.len(), 1);
    }
}
