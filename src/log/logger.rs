//! Per-category logger handles and logging scopes.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use super::record::LogRecord;
use super::severity::Severity;
use super::sink::Sink;

/// A handle bound to one category, fanning records out to every sink.
///
/// Cloning is cheap (three `Arc` clones) and clones are interchangeable.
/// Logging never fails from the caller's point of view: a sink that cannot
/// write is reported as a `tracing` warning and the call returns normally.
#[derive(Clone)]
pub struct Logger {
    category: Arc<str>,
    sinks: Arc<[Arc<dyn Sink>]>,
    scopes: Arc<[Arc<str>]>,
}

impl Logger {
    pub(crate) fn new(category: Arc<str>, sinks: Arc<[Arc<dyn Sink>]>) -> Self {
        Self { category, sinks, scopes: Arc::from(Vec::new()) }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether any sink would emit a record at `severity`. Emits nothing.
    pub fn is_enabled(&self, severity: Severity) -> bool {
        self.sinks.iter().any(|sink| sink.is_enabled(severity))
    }

    /// Emits `message` at `severity` to every sink enabled for it.
    ///
    /// `message` is only formatted when at least one sink is enabled, so
    /// passing `format_args!(..)` costs nothing for filtered-out levels.
    /// A sink that errors or panics is reported as a warning and skipped.
    pub fn log(&self, severity: Severity, message: impl fmt::Display) {
        if !self.is_enabled(severity) {
            return;
        }
        let record = LogRecord::new(
            severity,
            Arc::clone(&self.category),
            message.to_string(),
            Arc::clone(&self.scopes),
        );
        for sink in self.sinks.iter().filter(|sink| sink.is_enabled(severity)) {
            match panic::catch_unwind(AssertUnwindSafe(|| sink.emit(&record))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(category = %self.category, %severity, error = %e, "log sink failed to emit record");
                }
                Err(_) => {
                    warn!(category = %self.category, %severity, "log sink panicked while emitting record");
                }
            }
        }
    }

    pub fn trace(&self, message: impl fmt::Display) { self.log(Severity::Trace, message) }
    pub fn debug(&self, message: impl fmt::Display) { self.log(Severity::Debug, message) }
    pub fn info(&self, message: impl fmt::Display) { self.log(Severity::Information, message) }
    pub fn warn(&self, message: impl fmt::Display) { self.log(Severity::Warning, message) }
    pub fn error(&self, message: impl fmt::Display) { self.log(Severity::Error, message) }
    pub fn critical(&self, message: impl fmt::Display) { self.log(Severity::Critical, message) }

    /// Opens a scope whose records carry `state`, e.g. a request id.
    ///
    /// The returned [`Scope`] owns its own handle; this logger is unchanged.
    /// Scopes nest: a scope opened on a scoped logger carries both states.
    ///
    /// ```rust
    /// use loggr::log::{LoggerFactory, MemorySink};
    ///
    /// let sink = MemorySink::new();
    /// let factory = LoggerFactory::builder().sink(sink.clone()).build();
    /// let logger = factory.create_logger("Orders").unwrap();
    ///
    /// let mut scope = logger.begin_scope("order=42");
    /// if let Some(log) = scope.logger() {
    ///     log.info("reserved stock");
    /// }
    /// scope.release();
    /// scope.release(); // no-op
    ///
    /// let record = &sink.records()[0];
    /// assert_eq!(record.scopes().collect::<Vec<_>>(), ["order=42"]);
    /// ```
    pub fn begin_scope(&self, state: impl fmt::Display) -> Scope {
        let mut scopes = self.scopes.to_vec();
        scopes.push(Arc::from(state.to_string()));
        let logger = Self {
            category: Arc::clone(&self.category),
            sinks: Arc::clone(&self.sinks),
            scopes: scopes.into(),
        };
        Scope { logger: Some(logger) }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("category", &self.category)
            .field("sinks", &self.sinks.len())
            .field("scopes", &self.scopes)
            .finish()
    }
}

// ── Scope ─────────────────────────────────────────────────────────────────────

/// A logical grouping of log calls, released on drop.
///
/// Release is idempotent: calling [`release`](Self::release) any number of
/// times, then dropping, is always safe.
#[derive(Debug)]
pub struct Scope {
    logger: Option<Logger>,
}

impl Scope {
    /// The scoped handle, or `None` once the scope has been released.
    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.logger.is_none()
    }

    pub fn release(&mut self) {
        self.logger = None;
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::log::{MemorySink, SeverityFilter};

    struct BrokenSink;

    impl Sink for BrokenSink {
        fn is_enabled(&self, _: Severity) -> bool { true }
        fn emit(&self, _: &LogRecord) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotConnected, "collector unreachable"))
        }
    }

    fn logger_with(sinks: Vec<Arc<dyn Sink>>) -> Logger {
        Logger::new(Arc::from("Orders"), sinks.into())
    }

    #[test]
    fn is_enabled_does_not_emit() {
        let sink = MemorySink::new();
        let logger = logger_with(vec![Arc::new(sink.clone())]);
        for s in Severity::ALL {
            let _ = logger.is_enabled(s);
        }
        assert!(sink.records().is_empty());
    }

    #[test]
    fn enabled_if_any_sink_accepts() {
        let warn_only = MemorySink::new().with_filter(SeverityFilter::at_least(Severity::Warning));
        let trace_only = MemorySink::new().with_filter(SeverityFilter::only(&[Severity::Trace]));
        let logger = logger_with(vec![Arc::new(warn_only.clone()), Arc::new(trace_only.clone())]);

        assert!(logger.is_enabled(Severity::Trace));
        assert!(!logger.is_enabled(Severity::Debug));

        logger.trace("t");
        logger.error("e");
        assert_eq!(trace_only.messages(), ["t"]);
        assert_eq!(warn_only.messages(), ["e"]);
    }

    #[test]
    fn disabled_levels_skip_formatting() {
        struct Explodes;
        impl fmt::Display for Explodes {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("formatted a filtered-out message")
            }
        }

        let logger = logger_with(vec![Arc::new(MemorySink::new())]);
        logger.trace(Explodes);
    }

    #[test]
    fn failing_sink_does_not_stop_the_others() {
        let sink = MemorySink::new();
        let logger = logger_with(vec![Arc::new(BrokenSink), Arc::new(sink.clone())]);
        logger.info("still recorded");
        assert_eq!(sink.messages(), ["still recorded"]);
    }

    #[test]
    fn panicking_sink_is_contained() {
        struct PanickingSink;

        impl Sink for PanickingSink {
            fn is_enabled(&self, _: Severity) -> bool { true }
            fn emit(&self, _: &LogRecord) -> io::Result<()> {
                panic!("sink bug")
            }
        }

        let sink = MemorySink::new();
        let logger = logger_with(vec![Arc::new(PanickingSink), Arc::new(sink.clone())]);
        logger.info("first");
        logger.info("second");
        assert_eq!(sink.messages(), ["first", "second"]);
    }

    #[test]
    fn nested_scopes_chain_and_leave_parent_untouched() {
        let sink = MemorySink::new();
        let logger = logger_with(vec![Arc::new(sink.clone())]);

        let outer = logger.begin_scope("GET /orders");
        let inner = outer.logger().unwrap().begin_scope("tenant=7");
        inner.logger().unwrap().debug("inside");
        logger.debug("outside");

        let records = sink.records();
        assert_eq!(records[0].scopes().collect::<Vec<_>>(), ["GET /orders", "tenant=7"]);
        assert_eq!(records[1].scopes().count(), 0);
    }

    #[test]
    fn double_release_is_harmless() {
        let logger = logger_with(vec![Arc::new(MemorySink::new())]);
        let mut scope = logger.begin_scope(42);
        assert!(!scope.is_released());

        scope.release();
        scope.release();
        assert!(scope.is_released());
        assert!(scope.logger().is_none());
        drop(scope);

        logger.info("logger outlives its scopes");
    }
}
