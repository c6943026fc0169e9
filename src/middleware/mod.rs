//! Middleware layer.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns. A middleware is a [`Stage`](crate::Stage) that owns
//! the next stage; a [`Layer`] builds one around any given stage, which is
//! what [`Router::layer`](crate::Router::layer) applies to every route.
//!
//! Built-in middleware:
//! - [`timing`]: entry/exit records with status code and execution time

use crate::handler::BoxedStage;

pub mod timing;

pub use timing::{Timing, TimingLayer};

/// Wraps a stage in middleware.
pub trait Layer: Send + Sync + 'static {
    fn layer(&self, next: BoxedStage) -> BoxedStage;
}
