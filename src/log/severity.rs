//! Severity levels and the per-sink filter over them.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::warn;

use crate::error::Error;

/// Log severity, ordered from least to most severe.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Trace,
    Debug,
    Information,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// Every level, least severe first.
    pub const ALL: [Severity; 6] = [
        Self::Trace,
        Self::Debug,
        Self::Information,
        Self::Warning,
        Self::Error,
        Self::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace       => "Trace",
            Self::Debug       => "Debug",
            Self::Information => "Information",
            Self::Warning     => "Warning",
            Self::Error       => "Error",
            Self::Critical    => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive. Accepts the short forms `info` and `warn` as well.
impl FromStr for Severity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace"               => Ok(Self::Trace),
            "debug"               => Ok(Self::Debug),
            "information" | "info" => Ok(Self::Information),
            "warning" | "warn"    => Ok(Self::Warning),
            "error"               => Ok(Self::Error),
            "critical"            => Ok(Self::Critical),
            _                     => Err(Error::UnknownSeverity(s.to_owned())),
        }
    }
}

// ── SeverityFilter ────────────────────────────────────────────────────────────

/// Decides, per severity, whether a sink accepts a record.
///
/// A filter is a predicate, not a threshold table: [`at_least`](Self::at_least)
/// covers the common case, [`only`](Self::only) and [`from_fn`](Self::from_fn)
/// cover the rest. The default accepts `Debug` and above.
///
/// ```rust
/// use loggr::log::{Severity, SeverityFilter};
///
/// let filter = SeverityFilter::at_least(Severity::Warning);
/// assert!(!filter.allows(Severity::Information));
/// assert!(filter.allows(Severity::Critical));
/// ```
#[derive(Clone)]
pub struct SeverityFilter {
    predicate: Arc<dyn Fn(Severity) -> bool + Send + Sync>,
}

impl SeverityFilter {
    pub fn at_least(min: Severity) -> Self {
        Self::from_fn(move |s| s >= min)
    }

    pub fn only(levels: &[Severity]) -> Self {
        let levels = levels.to_vec();
        Self::from_fn(move |s| levels.contains(&s))
    }

    pub fn from_fn(predicate: impl Fn(Severity) -> bool + Send + Sync + 'static) -> Self {
        Self { predicate: Arc::new(predicate) }
    }

    pub fn all() -> Self {
        Self::from_fn(|_| true)
    }

    pub fn off() -> Self {
        Self::from_fn(|_| false)
    }

    /// Reads a minimum severity from the environment variable `var`.
    ///
    /// `none` / `off` disable the sink entirely. An unset variable yields the
    /// default filter; an unparsable one yields the default and a warning.
    pub fn from_env(var: &str) -> Self {
        let Ok(raw) = std::env::var(var) else {
            return Self::default();
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Self::off(),
            _ => match raw.parse::<Severity>() {
                Ok(min) => Self::at_least(min),
                Err(e) => {
                    warn!(var, error = %e, "ignoring log level from environment");
                    Self::default()
                }
            },
        }
    }

    /// Pure query: whether `severity` passes this filter.
    pub fn allows(&self, severity: Severity) -> bool {
        (self.predicate)(severity)
    }
}

impl Default for SeverityFilter {
    fn default() -> Self {
        Self::at_least(Severity::Debug)
    }
}

impl fmt::Debug for SeverityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allowed: Vec<_> = Severity::ALL.into_iter().filter(|s| self.allows(*s)).collect();
        f.debug_struct("SeverityFilter").field("allows", &allowed).finish()
    }
}
