use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use truckplan_forecast::Dataset;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/datasets", post(load_dataset))
        .route("/salespeople", get(list_salespeople))
}

/// Replace the tenant's scope and history (stand-in for the warehouse sync).
pub async fn load_dataset(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    body: Result<Json<Dataset>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let tenant_id = tenant.tenant_id();

    let (scope_entries, history_facts) = match services.load_dataset(tenant_id, body) {
        Ok(counts) => counts,
        Err(e) => return errors::provider_error_to_response(e),
    };

    info!(%tenant_id, scope_entries, history_facts, "dataset loaded");

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "tenant_id": tenant_id.to_string(),
            "scope_entries": scope_entries,
            "history_facts": history_facts,
        })),
    )
        .into_response()
}

pub async fn list_salespeople(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    match services.salespeople(tenant.tenant_id()) {
        Ok(salespeople) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "count": salespeople.len(),
                "salespeople": salespeople,
            })),
        )
            .into_response(),
        Err(e) => errors::provider_error_to_response(e),
    }
}
