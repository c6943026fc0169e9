//! Pluggable logging sinks.
//!
//! ```text
//! LoggerFactory ──create_logger("Orders")──► Logger ──log()──► Sink, Sink, …
//!      ▲                                        │
//!  builder().sink(..).build()              begin_scope() ──► Scope
//! ```
//!
//! The factory is composed once at startup and frozen. Loggers are cheap
//! per-category handles; call sites depend only on [`Logger`], so sinks can
//! be swapped without touching them.

mod factory;
mod forward;
mod logger;
mod record;
mod severity;
mod sink;
mod writer;

pub use factory::{LoggerFactory, LoggerFactoryBuilder, global, install};
pub use forward::TracingSink;
pub use logger::{Logger, Scope};
pub use record::LogRecord;
pub use severity::{Severity, SeverityFilter};
pub use sink::{MemorySink, Sink};
pub use writer::{ConsoleSink, DEFAULT_QUEUE_CAPACITY, Stream, WriterSink};
