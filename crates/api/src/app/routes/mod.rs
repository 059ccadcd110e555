use axum::{routing::get, Router};

pub mod inventory;
pub mod products;
pub mod system;

/// Router for every versioned endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/inventory", inventory::router())
        .nest("/product", products::router())
}
