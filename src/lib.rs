//! # loggr
//!
//! Request timing middleware and pluggable log sinks for a minimal HTTP
//! stack.
//!
//! Two pieces, composed in a pipeline:
//!
//! - [`log`]: a [`LoggerFactory`](log::LoggerFactory) holding the sinks
//!   installed at startup (console, file, `tracing`, memory, your own), and
//!   cheap per-category [`Logger`](log::Logger) handles that fan records out
//!   to them. Logging never fails a request.
//! - [`middleware::Timing`]: wraps the next stage, logs before and after it,
//!   and reports `Statuscode: <int> Executiontime: <ms>` once the stage
//!   returns, fails, or is cancelled.
//!
//! The rest ([`Router`], [`Server`]) is just enough host to run the
//! pipeline: hyper underneath, radix-tree routing, graceful shutdown.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use loggr::log::{self, ConsoleSink, LoggerFactory, SeverityFilter};
//! use loggr::middleware::TimingLayer;
//! use loggr::{Request, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), loggr::Error> {
//!     let factory = log::install(
//!         LoggerFactory::builder()
//!             .sink(ConsoleSink::new().filter(SeverityFilter::from_env("LOGGR_LEVEL")))
//!             .build(),
//!     )?;
//!
//!     let app = Router::new()
//!         .get("/orders/{id}", get_order)
//!         .layer(TimingLayer::from_factory(factory)?);
//!
//!     let served = Server::bind("0.0.0.0:3000").serve(app).await;
//!     factory.shutdown();
//!     served
//! }
//!
//! async fn get_order(req: Request) -> Response {
//!     let id = req.param("id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#))
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod log;
pub mod middleware;

pub use error::Error;
pub use handler::{BoxFuture, BoxedStage, Handler, HandlerError, HandlerResult, IntoOutcome, Stage};
pub use request::{Request, RequestBuilder};
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::{Router, Routes};
pub use server::{DEFAULT_BODY_LIMIT, Server};
