//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. Routes are collected in
//! a [`Router`], wrapped by middleware layers, then compiled into
//! [`Routes`] when the server starts.

use std::collections::HashMap;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxedStage, Handler, HandlerResult};
use crate::middleware::Layer;
use crate::request::Request;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Each registration returns `self` so calls chain naturally.
///
/// ```rust,no_run
/// # use loggr::{Request, Response, Router};
/// # async fn get_order(_: Request) -> Response { Response::text("") }
/// # async fn create_order(_: Request) -> Response { Response::text("") }
/// Router::new()
///     .get("/orders/{id}", get_order)
///     .post("/orders",     create_order);
/// ```
pub struct Router {
    routes: Vec<(Method, String, BoxedStage)>,
    fallback: BoxedStage,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new(), fallback: not_found.into_stage() }
    }

    /// Register a handler for a method + path pair.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes.push((method, path.to_owned(), handler.into_stage()));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Replaces the handler for requests that match no route (default: `404`).
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = handler.into_stage();
        self
    }

    /// Wraps every route registered so far, and the fallback, in `layer`.
    ///
    /// Layers added later wrap the earlier ones, so the last layer sees the
    /// request first. A timing layer added last therefore includes the
    /// overhead of every other layer in its measurement.
    pub fn layer(mut self, layer: impl Layer) -> Self {
        for (_, _, stage) in &mut self.routes {
            *stage = layer.layer(Arc::clone(stage));
        }
        self.fallback = layer.layer(Arc::clone(&self.fallback));
        self
    }

    /// Compiles the routes into lookup trees.
    ///
    /// Fails with [`Error::InvalidRoute`] on a malformed or duplicate path.
    pub fn finish(self) -> Result<Routes, Error> {
        let mut trees: HashMap<Method, MatchitRouter<BoxedStage>> = HashMap::new();
        for (method, path, stage) in self.routes {
            trees
                .entry(method)
                .or_default()
                .insert(path.as_str(), stage)
                .map_err(|e| Error::InvalidRoute { path, reason: e.to_string() })?;
        }
        Ok(Routes { trees, fallback: self.fallback })
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

async fn not_found(_req: Request) -> StatusCode {
    StatusCode::NOT_FOUND
}

// ── Routes ────────────────────────────────────────────────────────────────────

/// A compiled, immutable routing table.
pub struct Routes {
    trees: HashMap<Method, MatchitRouter<BoxedStage>>,
    fallback: BoxedStage,
}

impl Routes {
    /// Routes one request through its stage chain.
    pub async fn dispatch(&self, mut req: Request) -> HandlerResult {
        let stage = match self.lookup(req.method(), req.path()) {
            Some((stage, params)) => {
                req.set_params(params);
                stage
            }
            None => Arc::clone(&self.fallback),
        };
        stage.call(req).await
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedStage, HashMap<String, String>)> {
        let tree = self.trees.get(method)?;
        let matched = tree.at(path).ok()?;
        let stage = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((stage, params))
    }
}
