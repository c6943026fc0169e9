//! Line-oriented sinks: the console and any `io::Write`.
//!
//! Lines are formatted on the caller's thread and handed to a dedicated
//! writer thread through a bounded queue. `emit` never waits on I/O: when the
//! queue is full the record is dropped and `emit` reports
//! [`io::ErrorKind::WouldBlock`], which the logger turns into a warning.

use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::mem;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

use super::record::LogRecord;
use super::severity::{Severity, SeverityFilter};
use super::sink::Sink;

/// Lines a writer-backed sink buffers before it starts dropping records.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Which standard stream a [`ConsoleSink`] writes to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Stream {
    #[default]
    Stdout,
    Stderr,
}

impl Stream {
    fn writer(self) -> Box<dyn Write + Send> {
        match self {
            Stream::Stdout => Box::new(io::stdout()),
            Stream::Stderr => Box::new(io::stderr()),
        }
    }
}

/// Writes one plain-text line per record to stdout or stderr.
#[derive(Debug)]
pub struct ConsoleSink {
    inner: WriterSink,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { inner: WriterSink::new(Stream::Stdout.writer()) }
    }

    pub fn stream(mut self, stream: Stream) -> Self {
        self.inner.replace_writer(stream.writer());
        self
    }

    pub fn filter(mut self, filter: SeverityFilter) -> Self {
        self.inner = self.inner.filter(filter);
        self
    }

    pub fn include_scopes(mut self, yes: bool) -> Self {
        self.inner = self.inner.include_scopes(yes);
        self
    }

    pub fn queue_capacity(mut self, lines: usize) -> Self {
        self.inner = self.inner.queue_capacity(lines);
        self
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for ConsoleSink {
    fn is_enabled(&self, severity: Severity) -> bool {
        self.inner.is_enabled(severity)
    }

    fn emit(&self, record: &LogRecord) -> io::Result<()> {
        self.inner.emit(record)
    }

    fn shutdown(&self) -> io::Result<()> {
        self.inner.shutdown()
    }
}

// ── WriterSink ────────────────────────────────────────────────────────────────

/// Writes one line per record to an owned writer (a file, a socket, a buffer).
///
/// The writer moves to a background thread on the first emitted record.
/// Shutdown, or dropping the last handle to the sink, drains the queue,
/// flushes and closes the writer. Records emitted after shutdown fail with
/// [`io::ErrorKind::BrokenPipe`].
pub struct WriterSink {
    worker: Mutex<Worker>,
    filter: SeverityFilter,
    include_scopes: bool,
    capacity: usize,
}

enum Worker {
    Idle(Box<dyn Write + Send>),
    Running { lines: mpsc::Sender<String>, thread: JoinHandle<io::Result<()>> },
    Closed,
}

impl WriterSink {
    /// Appends to the file at `path`, creating it if needed.
    pub fn append_to(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }

    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            worker: Mutex::new(Worker::Idle(Box::new(writer))),
            filter: SeverityFilter::default(),
            include_scopes: false,
            capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn filter(mut self, filter: SeverityFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn include_scopes(mut self, yes: bool) -> Self {
        self.include_scopes = yes;
        self
    }

    /// Bounds the queue between callers and the writer thread (minimum 1).
    pub fn queue_capacity(mut self, lines: usize) -> Self {
        self.capacity = lines.max(1);
        self
    }

    fn replace_writer(&mut self, writer: Box<dyn Write + Send>) {
        *self.worker.get_mut().unwrap_or_else(PoisonError::into_inner) = Worker::Idle(writer);
    }
}

impl Worker {
    /// The queue into the writer thread, starting the thread on first use.
    fn lines(&mut self, capacity: usize) -> io::Result<&mpsc::Sender<String>> {
        if matches!(self, Worker::Idle(_)) {
            if let Worker::Idle(writer) = mem::replace(self, Worker::Closed) {
                let (lines, queue) = mpsc::channel(capacity);
                let thread = thread::Builder::new()
                    .name("loggr-writer".into())
                    .spawn(move || drain(writer, queue))?;
                *self = Worker::Running { lines, thread };
            }
        }
        match self {
            Worker::Running { lines, .. } => Ok(&*lines),
            _ => Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink is shut down")),
        }
    }

    fn state(&self) -> &'static str {
        match self {
            Worker::Idle(_) => "idle",
            Worker::Running { .. } => "running",
            Worker::Closed => "closed",
        }
    }
}

/// Writer thread body: writes queued lines until every sender is gone.
fn drain(mut writer: Box<dyn Write + Send>, mut queue: mpsc::Receiver<String>) -> io::Result<()> {
    while let Some(line) = queue.blocking_recv() {
        write_line(&mut writer, &line);
        while let Ok(line) = queue.try_recv() {
            write_line(&mut writer, &line);
        }
        if let Err(e) = writer.flush() {
            warn!(error = %e, "log writer failed to flush");
        }
    }
    writer.flush()
}

fn write_line(writer: &mut dyn Write, line: &str) {
    if let Err(e) = writeln!(writer, "{line}") {
        warn!(error = %e, "log writer failed to write record");
    }
}

impl Sink for WriterSink {
    fn is_enabled(&self, severity: Severity) -> bool {
        self.filter.allows(severity)
    }

    fn emit(&self, record: &LogRecord) -> io::Result<()> {
        let line = record.line(self.include_scopes);
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        match worker.lines(self.capacity)?.try_send(line) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                "log writer is behind, record dropped",
            )),
            Err(TrySendError::Closed(_)) => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "log writer thread has stopped",
            )),
        }
    }

    fn shutdown(&self) -> io::Result<()> {
        let worker = mem::replace(
            &mut *self.worker.lock().unwrap_or_else(PoisonError::into_inner),
            Worker::Closed,
        );
        match worker {
            Worker::Idle(mut writer) => writer.flush(),
            Worker::Running { lines, thread } => {
                drop(lines);
                thread
                    .join()
                    .unwrap_or_else(|_| Err(io::Error::other("log writer thread panicked")))
            }
            Worker::Closed => Ok(()),
        }
    }
}

impl Drop for WriterSink {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "log writer failed to close cleanly");
        }
    }
}

impl fmt::Debug for WriterSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("WriterSink")
            .field("filter", &self.filter)
            .field("include_scopes", &self.include_scopes)
            .field("capacity", &self.capacity)
            .field("worker", &worker.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn record(severity: Severity, message: &str) -> LogRecord {
        let scopes: Vec<Arc<str>> = vec![Arc::from("req-1")];
        LogRecord::new(severity, Arc::from("Orders"), message.to_owned(), scopes.into())
    }

    /// A buffer the test keeps a handle to. Writes wait while `gate` is held.
    #[derive(Clone, Default)]
    struct Shared {
        out: Arc<Mutex<Vec<u8>>>,
        gate: Arc<Mutex<()>>,
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.out.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Shared {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let _open = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            self.out.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writes_one_line_per_record() {
        let buf = Shared::default();
        let sink = WriterSink::new(buf.clone());
        sink.emit(&record(Severity::Information, "placed")).unwrap();
        sink.emit(&record(Severity::Error, "rejected")).unwrap();
        sink.shutdown().unwrap();

        assert_eq!(buf.text(), "Orders Information: placed\nOrders Error: rejected\n");
    }

    #[test]
    fn scopes_follow_the_message_when_enabled() {
        let buf = Shared::default();
        let sink = WriterSink::new(buf.clone()).include_scopes(true);
        sink.emit(&record(Severity::Debug, "looked up")).unwrap();
        sink.shutdown().unwrap();

        assert_eq!(buf.text(), "Orders Debug: looked up => req-1\n");
    }

    #[test]
    fn emit_after_shutdown_is_an_error_not_a_panic() {
        let sink = WriterSink::new(Shared::default());
        sink.shutdown().unwrap();
        sink.shutdown().unwrap();

        let err = sink.emit(&record(Severity::Warning, "late")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn stalled_writer_drops_records_instead_of_blocking() {
        let buf = Shared::default();
        let held = buf.gate.lock().unwrap();
        let sink = WriterSink::new(buf.clone()).queue_capacity(1);

        let outcomes: Vec<_> = (0..10)
            .map(|i| sink.emit(&record(Severity::Information, &format!("r{i}"))))
            .collect();
        let accepted = outcomes.iter().filter(|o| o.is_ok()).count();
        assert!((1..=2).contains(&accepted), "{outcomes:?}");
        for err in outcomes.iter().filter_map(|o| o.as_ref().err()) {
            assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
        }

        drop(held);
        sink.shutdown().unwrap();
        assert_eq!(buf.text().lines().count(), accepted);
    }

    #[test]
    fn dropping_the_sink_flushes_queued_lines() {
        let buf = Shared::default();
        let sink = WriterSink::new(buf.clone());
        sink.emit(&record(Severity::Information, "queued")).unwrap();
        drop(sink);

        assert_eq!(buf.text(), "Orders Information: queued\n");
    }

    #[test]
    fn filter_is_configurable() {
        let sink = WriterSink::new(Shared::default()).filter(SeverityFilter::at_least(Severity::Error));
        assert!(!sink.is_enabled(Severity::Warning));
        assert!(sink.is_enabled(Severity::Critical));
    }

    #[test]
    fn console_options_reach_the_inner_writer() {
        let sink = ConsoleSink::new()
            .stream(Stream::Stderr)
            .filter(SeverityFilter::at_least(Severity::Error))
            .queue_capacity(0);
        assert!(!sink.is_enabled(Severity::Warning));
        assert!(sink.is_enabled(Severity::Error));
        assert_eq!(sink.inner.capacity, 1);
        sink.shutdown().unwrap();
    }
}
