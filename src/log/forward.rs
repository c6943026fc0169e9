//! A sink that forwards records into the `tracing` pipeline.
//!
//! This is the "debug stream" sink: whatever subscriber the host installed
//! (`tracing_subscriber::fmt`, a JSON layer, a test writer) receives the
//! records as events with `category` and `severity` fields.

use std::io;

use tracing::{debug, error, info, trace, warn};

use super::record::LogRecord;
use super::severity::{Severity, SeverityFilter};
use super::sink::Sink;

#[derive(Debug, Default)]
pub struct TracingSink {
    filter: SeverityFilter,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: SeverityFilter) -> Self {
        self.filter = filter;
        self
    }
}

impl Sink for TracingSink {
    fn is_enabled(&self, severity: Severity) -> bool {
        self.filter.allows(severity)
    }

    fn emit(&self, record: &LogRecord) -> io::Result<()> {
        let category = record.category();
        let severity = record.severity();
        let scopes = record.scopes().collect::<Vec<_>>().join(" => ");
        let message = record.message();

        // `tracing` levels are compile-time constants, hence one arm each.
        // Critical has no level of its own and shares ERROR.
        match severity {
            Severity::Trace => trace!(category, %severity, scopes = %scopes, "{message}"),
            Severity::Debug => debug!(category, %severity, scopes = %scopes, "{message}"),
            Severity::Information => info!(category, %severity, scopes = %scopes, "{message}"),
            Severity::Warning => warn!(category, %severity, scopes = %scopes, "{message}"),
            Severity::Error | Severity::Critical => {
                error!(category, %severity, scopes = %scopes, "{message}")
            }
        }
        Ok(())
    }
}
