//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: provider store + forecast scheduling
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and query parsing
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    // Tenant-scoped routes: require the tenant header.
    let scoped = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::tenant_middleware))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(scoped)
}
