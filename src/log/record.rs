//! The unit handed to every sink.

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use super::severity::Severity;

/// One emitted log record. Immutable once built.
#[derive(Clone, Debug)]
pub struct LogRecord {
    severity: Severity,
    category: Arc<str>,
    message: String,
    timestamp: SystemTime,
    scopes: Arc<[Arc<str>]>,
}

impl LogRecord {
    pub(crate) fn new(
        severity: Severity,
        category: Arc<str>,
        message: String,
        scopes: Arc<[Arc<str>]>,
    ) -> Self {
        Self { severity, category, message, timestamp: SystemTime::now(), scopes }
    }

    pub fn severity(&self) -> Severity { self.severity }
    pub fn category(&self) -> &str { &self.category }
    pub fn message(&self) -> &str { &self.message }
    pub fn timestamp(&self) -> SystemTime { self.timestamp }

    /// Active scope states at emission, outermost first.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scopes.iter().map(|s| &**s)
    }

    /// Plain-text line: `<category> <severity>: <message>`.
    ///
    /// With `include_scopes`, each scope state is appended as ` => <state>`.
    pub fn line(&self, include_scopes: bool) -> String {
        let mut line = self.to_string();
        if include_scopes {
            for scope in self.scopes.iter() {
                line.push_str(" => ");
                line.push_str(scope);
            }
        }
        line
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.category, self.severity, self.message)
    }
}
