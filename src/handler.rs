//! Handler trait, pipeline stages, and type erasure.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in one table, and
//! middleware wraps them without knowing their concrete type. Both work on
//! the same trait object, [`Stage`]:
//!
//! ```text
//! async fn list(req: Request) -> Response { … }   ← user writes this
//!        ↓ router.get("/orders", list)
//! list.into_stage()                               ← Handler blanket impl
//!        ↓
//! Arc::new(FnStage(list))                         ← BoxedStage
//!        ↓ router.layer(TimingLayer::new(logger))
//! Arc::new(Timing { next: <FnStage>, logger })    ← still a BoxedStage
//!        ↓
//! stage.call(req)  at request time                ← one vtable call per layer
//! ```

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// An error raised by a handler or stage.
pub type HandlerError = Box<dyn StdError + Send + Sync + 'static>;

/// What every stage of the pipeline resolves to.
pub type HandlerResult = Result<Response, HandlerError>;

/// A heap-allocated, type-erased future resolving to a [`HandlerResult`].
///
/// `Send + 'static` lets tokio move it across worker threads.
pub type BoxFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

/// One step of the request pipeline: a route handler or a middleware
/// wrapping the next step.
pub trait Stage: Send + Sync + 'static {
    fn call(&self, req: Request) -> BoxFuture;
}

/// A shared, type-erased stage. One `Arc` clone per request is the only
/// per-request cost of the erasure.
pub type BoxedStage = Arc<dyn Stage>;

// ── Handler outcomes ──────────────────────────────────────────────────────────

/// What a handler may return: anything that is [`IntoResponse`], or a
/// `Result` whose error converts into a [`HandlerError`].
pub trait IntoOutcome {
    fn into_outcome(self) -> HandlerResult;
}

impl<T: IntoResponse> IntoOutcome for T {
    fn into_outcome(self) -> HandlerResult {
        Ok(self.into_response())
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoResponse,
    E: Into<HandlerError>,
{
    fn into_outcome(self) -> HandlerResult {
        self.map(IntoResponse::into_response).map_err(Into::into)
    }
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is satisfied for any `async fn`
/// with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoOutcome
/// ```
///
/// The trait is **sealed**: only the blanket impl below can satisfy it.
/// Custom pipeline steps implement [`Stage`] instead.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    /// Erases the handler into a pipeline stage.
    fn into_stage(self) -> BoxedStage;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn into_stage(self) -> BoxedStage {
        Arc::new(FnStage(self))
    }
}

/// Newtype bridging a concrete handler `F` to the [`Stage`] trait object.
struct FnStage<F>(F);

impl<F, Fut, R> Stage for FnStage<F>
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoOutcome + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_outcome() })
    }
}
