//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the engine facade
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Every request gets a request id and a deadline `backend_timeout` from arrival.
pub fn build_app(services: services::AppServices, backend_timeout: Duration) -> Router {
    Router::new()
        .nest("/v1", routes::router())
        .layer(Extension(Arc::new(services)))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(axum::middleware::from_fn_with_state(
                    backend_timeout,
                    middleware::deadline_middleware,
                )),
        )
}
