//! The sink capability and the in-memory sink.
//!
//! Anything that implements [`Sink`] can sit behind a
//! [`LoggerFactory`](super::LoggerFactory): the console, a file, the
//! `tracing` pipeline, or a buffer in a test. Call sites only ever see a
//! [`Logger`](super::Logger), so swapping sinks never touches them.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use super::record::LogRecord;
use super::severity::{Severity, SeverityFilter};

/// A backend that makes log records visible or durable.
///
/// Sinks are shared by every in-flight request, hence `Send + Sync`. A sink
/// that writes to a single stream must serialise its own writes.
///
/// `emit` runs on the request path and must return promptly: a sink backed
/// by slow I/O should queue the record and write it elsewhere, as
/// [`WriterSink`](super::WriterSink) does. Implementations must not panic.
/// A panic in `emit` is caught and reported by the logger, but one raised
/// while a request is already unwinding from a panic aborts the process.
pub trait Sink: Send + Sync + 'static {
    /// Pure query: would a record at `severity` be emitted?
    fn is_enabled(&self, severity: Severity) -> bool;

    /// Writes one record. Errors are reported by the caller on a diagnostic
    /// channel and never reach request processing.
    fn emit(&self, record: &LogRecord) -> io::Result<()>;

    /// Releases held resources. Called once at factory shutdown. Must not
    /// panic.
    fn shutdown(&self) -> io::Result<()> {
        Ok(())
    }
}

// ── MemorySink ────────────────────────────────────────────────────────────────

/// Keeps every accepted record in memory.
///
/// Clones share one buffer, so a test can install one clone and read from
/// another.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
    filter: SeverityFilter,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: SeverityFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Snapshot of the records captured so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.records().iter().map(|r| r.message().to_owned()).collect()
    }

    pub fn clear(&self) {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl Sink for MemorySink {
    fn is_enabled(&self, severity: Severity) -> bool {
        self.filter.allows(severity)
    }

    fn emit(&self, record: &LogRecord) -> io::Result<()> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
        Ok(())
    }
}
