//! Unified error type.

/// The error type returned by loggr's fallible operations.
///
/// Handler failures are not `Error`s: they travel as
/// [`HandlerError`](crate::HandlerError) through the pipeline and come out
/// the other side as `500` responses. This type covers setup mistakes
/// (bad logger category, bad route, double install) and server I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A logger was requested for an empty category.
    #[error("invalid logger category: category must be a non-empty string")]
    InvalidCategory,

    /// [`log::install`](crate::log::install) was called more than once.
    #[error("a logger factory is already installed for this process")]
    AlreadyInstalled,

    /// A severity name that is not one of the six known levels.
    #[error("unknown severity `{0}`")]
    UnknownSeverity(String),

    /// Two routes collide, or a path is malformed.
    #[error("invalid route `{path}`: {reason}")]
    InvalidRoute { path: String, reason: String },

    /// Binding or accepting on the listener failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
