//! Request timing middleware.
//!
//! Every request passing through [`Timing`] produces exactly two records:
//!
//! ```text
//! loggr::middleware::timing Information: Before execution of GET /orders/7
//! loggr::middleware::timing Information: After execution of GET /orders/7. Statuscode: 404 Executiontime: 50
//! ```
//!
//! The exit record is an `Error` record with `Statuscode: failed` when the
//! next stage returns an error, and a `Warning` record with
//! `Statuscode: cancelled` when the request future is dropped or the next
//! stage panics. `Executiontime` is whole milliseconds on the monotonic
//! clock and covers the next stage only.

use std::sync::Arc;

use http::StatusCode;
use tokio::time::Instant;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedStage, HandlerError, HandlerResult, Stage};
use crate::log::{Logger, LoggerFactory};
use crate::middleware::Layer;
use crate::request::Request;

/// Wraps the next stage with entry and exit records.
///
/// Holds no per-request state: each call keeps its own timer, so concurrent
/// requests never see each other's measurements. Requests and responses
/// pass through untouched, and errors from the next stage are returned
/// exactly as received.
pub struct Timing {
    next: BoxedStage,
    logger: Logger,
}

impl Timing {
    /// Conventional category for the middleware's logger.
    pub const CATEGORY: &'static str = "loggr::middleware::timing";

    pub fn new(next: BoxedStage, logger: Logger) -> Self {
        Self { next, logger }
    }

    pub async fn handle(&self, req: Request) -> HandlerResult {
        run(Arc::clone(&self.next), self.logger.clone(), req).await
    }
}

impl Stage for Timing {
    fn call(&self, req: Request) -> BoxFuture {
        Box::pin(run(Arc::clone(&self.next), self.logger.clone(), req))
    }
}

async fn run(next: BoxedStage, logger: Logger, req: Request) -> HandlerResult {
    let target = format!("{} {}", req.method(), req.path());
    logger.info(format_args!("Before execution of {target}"));

    let timer = RequestTiming::start(&logger, &target);
    let result = next.call(req).await;
    match &result {
        Ok(response) => timer.finish(Exit::Completed(response.code())),
        Err(err) => timer.finish(Exit::Failed(err)),
    }
    result
}

// ── Per-request timing context ────────────────────────────────────────────────

enum Exit<'a> {
    Completed(StatusCode),
    Failed(&'a HandlerError),
    Cancelled,
}

/// Lives for exactly one invocation. If it is dropped without
/// [`finish`](Self::finish), the request was cancelled or the next stage
/// panicked, and the drop reports that instead.
struct RequestTiming<'a> {
    logger: &'a Logger,
    target: &'a str,
    start: Instant,
    reported: bool,
}

impl<'a> RequestTiming<'a> {
    fn start(logger: &'a Logger, target: &'a str) -> Self {
        Self { logger, target, start: Instant::now(), reported: false }
    }

    fn finish(mut self, exit: Exit<'_>) {
        self.report(exit);
    }

    fn report(&mut self, exit: Exit<'_>) {
        let elapsed = self.start.elapsed().as_millis();
        self.reported = true;

        let target = self.target;
        match exit {
            Exit::Completed(status) => self.logger.info(format_args!(
                "After execution of {target}. Statuscode: {} Executiontime: {elapsed}",
                status.as_u16(),
            )),
            Exit::Failed(err) => self.logger.error(format_args!(
                "After execution of {target} failed: {err}. Statuscode: failed Executiontime: {elapsed}",
            )),
            Exit::Cancelled => self.logger.warn(format_args!(
                "After execution of {target} was cancelled. Statuscode: cancelled Executiontime: {elapsed}",
            )),
        }
    }
}

impl Drop for RequestTiming<'_> {
    fn drop(&mut self) {
        if !self.reported {
            self.report(Exit::Cancelled);
        }
    }
}

// ── Layer ─────────────────────────────────────────────────────────────────────

/// Builds a [`Timing`] around each stage it is applied to.
///
/// ```rust
/// use loggr::log::{ConsoleSink, LoggerFactory};
/// use loggr::middleware::TimingLayer;
/// use loggr::{Request, Router};
///
/// # async fn list(_: Request) -> &'static str { "[]" }
/// let factory = LoggerFactory::builder().sink(ConsoleSink::new()).build();
/// let app = Router::new()
///     .get("/orders", list)
///     .layer(TimingLayer::from_factory(&factory).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct TimingLayer {
    logger: Logger,
}

impl TimingLayer {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Uses a logger for [`Timing::CATEGORY`] from `factory`.
    pub fn from_factory(factory: &LoggerFactory) -> Result<Self, Error> {
        factory.create_logger(Timing::CATEGORY).map(Self::new)
    }
}

impl Layer for TimingLayer {
    fn layer(&self, next: BoxedStage) -> BoxedStage {
        Arc::new(Timing::new(next, self.logger.clone()))
    }
}
