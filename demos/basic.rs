//! Minimal loggr example — timed JSON endpoints with console and tracing sinks.
//!
//! Run with:
//!   LOGGR_LEVEL=info RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/orders/42
//!   curl http://localhost:3000/slow
//!   curl http://localhost:3000/broken
//!   curl http://localhost:3000/nowhere

use std::time::Duration;

use http::StatusCode;
use loggr::log::{self, ConsoleSink, LoggerFactory, Severity, SeverityFilter, TracingSink};
use loggr::middleware::TimingLayer;
use loggr::{Request, Response, Router, Server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let factory = log::install(
        LoggerFactory::builder()
            .sink(ConsoleSink::new().filter(SeverityFilter::from_env("LOGGR_LEVEL")).include_scopes(true))
            .sink(TracingSink::new().filter(SeverityFilter::at_least(Severity::Error)))
            .build(),
    )?;

    let app = Router::new()
        .get("/orders/{id}", get_order)
        .get("/slow", slow)
        .get("/broken", broken)
        .layer(TimingLayer::from_factory(factory)?);

    let served = Server::bind("0.0.0.0:3000").serve(app).await;
    factory.shutdown();
    Ok(served?)
}

// GET /orders/{id}
async fn get_order(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    let orders = log::global().and_then(|f| f.create_logger("Orders").ok());
    if let Some(orders) = orders {
        let scope = orders.begin_scope(format_args!("order={id}"));
        if let Some(log) = scope.logger() {
            log.debug("looking up order");
        }
    }
    Response::json(format!(r#"{{"id":"{id}","status":"placed"}}"#))
}

// GET /slow → 404 after 50 ms
async fn slow(_req: Request) -> StatusCode {
    tokio::time::sleep(Duration::from_millis(50)).await;
    StatusCode::NOT_FOUND
}

// GET /broken → handler error, answered with 500
async fn broken(_req: Request) -> Result<Response, std::io::Error> {
    Err(std::io::Error::other("warehouse offline"))
}
