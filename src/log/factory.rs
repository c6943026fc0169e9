//! Sink registry and logger creation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use super::logger::Logger;
use super::sink::Sink;
use crate::error::Error;

/// The set of installed sinks, frozen at [`build`](LoggerFactoryBuilder::build).
///
/// A factory has no way to add or remove sinks: compose everything in the
/// builder during startup, before serving traffic.
///
/// ```rust
/// use loggr::log::{ConsoleSink, LoggerFactory, TracingSink};
///
/// let factory = LoggerFactory::builder()
///     .sink(ConsoleSink::new())
///     .sink(TracingSink::new())
///     .build();
///
/// let orders = factory.create_logger("Orders").unwrap();
/// orders.info("ready");
/// ```
pub struct LoggerFactory {
    sinks: Arc<[Arc<dyn Sink>]>,
    shut_down: AtomicBool,
}

impl LoggerFactory {
    pub fn builder() -> LoggerFactoryBuilder {
        LoggerFactoryBuilder { sinks: Vec::new() }
    }

    /// Returns a handle bound to `category`.
    ///
    /// Fails with [`Error::InvalidCategory`] when `category` is empty or
    /// whitespace only. Every call returns a fresh, independent handle.
    pub fn create_logger(&self, category: &str) -> Result<Logger, Error> {
        if category.trim().is_empty() {
            return Err(Error::InvalidCategory);
        }
        Ok(Logger::new(Arc::from(category), Arc::clone(&self.sinks)))
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Shuts every sink down once. Later calls do nothing.
    ///
    /// Sink failures are reported as warnings and otherwise ignored. Loggers
    /// still alive afterwards keep working; sinks that released their
    /// resources simply report failed emits.
    ///
    /// Dropping the factory does not shut sinks down: loggers created from
    /// it share the sinks and keep them open until the last handle goes.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::AcqRel) {
            return;
        }
        for sink in self.sinks.iter() {
            if let Err(e) = sink.shutdown() {
                warn!(error = %e, "log sink failed to shut down cleanly");
            }
        }
        debug!(sinks = self.sinks.len(), "logger factory shut down");
    }
}

impl fmt::Debug for LoggerFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerFactory")
            .field("sinks", &self.sinks.len())
            .field("shut_down", &self.shut_down.load(Ordering::Acquire))
            .finish()
    }
}

/// Collects sinks during startup. Obtain via [`LoggerFactory::builder`].
pub struct LoggerFactoryBuilder {
    sinks: Vec<Arc<dyn Sink>>,
}

impl LoggerFactoryBuilder {
    pub fn sink(self, sink: impl Sink) -> Self {
        self.shared_sink(Arc::new(sink))
    }

    /// Adds a sink the caller keeps a handle to.
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn build(self) -> LoggerFactory {
        LoggerFactory { sinks: self.sinks.into(), shut_down: AtomicBool::new(false) }
    }
}

// ── Process-wide factory ──────────────────────────────────────────────────────

static GLOBAL: OnceLock<LoggerFactory> = OnceLock::new();

/// Installs `factory` as the process-wide factory.
///
/// Call once during startup. A second call fails with
/// [`Error::AlreadyInstalled`] and leaves the first factory in place. The
/// installed factory is never dropped; call
/// [`shutdown`](LoggerFactory::shutdown) on it before the process exits.
pub fn install(factory: LoggerFactory) -> Result<&'static LoggerFactory, Error> {
    GLOBAL.set(factory).map_err(|_| Error::AlreadyInstalled)?;
    GLOBAL.get().ok_or(Error::AlreadyInstalled)
}

/// The process-wide factory, if one was installed.
pub fn global() -> Option<&'static LoggerFactory> {
    GLOBAL.get()
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::log::{LogRecord, MemorySink, Severity};

    #[derive(Default)]
    struct CountingSink {
        shutdowns: AtomicUsize,
        fail: bool,
    }

    impl Sink for CountingSink {
        fn is_enabled(&self, _: Severity) -> bool { true }
        fn emit(&self, _: &LogRecord) -> io::Result<()> { Ok(()) }
        fn shutdown(&self) -> io::Result<()> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(io::Error::other("socket already closed"));
            }
            Ok(())
        }
    }

    #[test]
    fn empty_category_is_rejected() {
        let factory = LoggerFactory::builder().sink(MemorySink::new()).build();
        assert!(matches!(factory.create_logger(""), Err(Error::InvalidCategory)));
        assert!(matches!(factory.create_logger("   "), Err(Error::InvalidCategory)));
    }

    #[test]
    fn named_category_yields_usable_handle() {
        let sink = MemorySink::new();
        let factory = LoggerFactory::builder().sink(sink.clone()).build();

        let logger = factory.create_logger("Orders").unwrap();
        assert_eq!(logger.category(), "Orders");
        logger.info("hello");

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category(), "Orders");
        assert_eq!(records[0].severity(), Severity::Information);
    }

    #[test]
    fn shutdown_runs_once_even_when_a_sink_fails() {
        let failing = Arc::new(CountingSink { fail: true, ..Default::default() });
        let healthy = Arc::new(CountingSink::default());
        let factory = LoggerFactory::builder()
            .shared_sink(failing.clone())
            .shared_sink(healthy.clone())
            .build();

        factory.shutdown();
        factory.shutdown();
        drop(factory);

        assert_eq!(failing.shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(healthy.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_the_factory_leaves_sinks_to_live_loggers() {
        let counting = Arc::new(CountingSink::default());
        let memory = MemorySink::new();
        let factory = LoggerFactory::builder()
            .shared_sink(counting.clone())
            .sink(memory.clone())
            .build();
        let logger = factory.create_logger("Orders").unwrap();
        drop(factory);

        logger.info("after the factory is gone");
        assert_eq!(counting.shutdowns.load(Ordering::SeqCst), 0);
        assert_eq!(memory.messages(), ["after the factory is gone"]);
    }
}
