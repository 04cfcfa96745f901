use axum::{routing::get, Router};

pub mod datasets;
pub mod forecasts;
pub mod system;

/// Router for all tenant-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(datasets::router())
        .nest("/forecasts", forecasts::router())
}
