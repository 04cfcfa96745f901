use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::warn;

use crate::app::dto::{self, ForecastQuery, ForecastResponse, InlineForecastRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new().route("/", get(get_forecast).post(post_forecast))
}

/// Forecast over the tenant's stored scope and history.
pub async fn get_forecast(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> axum::response::Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return errors::query_rejection_to_response(rejection),
    };
    let target_week = match dto::parse_target_week(query.target_week.as_deref()) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let projection = match dto::parse_projection(query.projection.as_deref()) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let granularity = match dto::parse_granularity(query.granularity.as_deref()) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let request = match dto::build_request(query.horizon, services.default_horizon(), target_week, projection) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let salesperson = query.salesperson.filter(|s| !s.trim().is_empty());

    let run = match services.plan(tenant.tenant_id(), salesperson.clone(), request) {
        Ok(run) => run,
        Err(e) => return errors::service_error_to_response(e),
    };

    if run.empty_scope {
        warn!(tenant_id = %tenant.tenant_id(), ?salesperson, "forecast requested for empty scope");
    }

    (StatusCode::OK, Json(ForecastResponse::new(run, granularity))).into_response()
}

/// Forecast over caller-supplied scope and history.
pub async fn post_forecast(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    body: Result<Json<InlineForecastRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };
    let granularity = match dto::parse_granularity(body.granularity.as_deref()) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let target_week = body.target_week_start.unwrap_or_else(dto::current_week);
    let request = match dto::build_request(
        body.horizon_weeks,
        services.default_horizon(),
        target_week,
        body.projection.unwrap_or_default(),
    ) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.plan_inline(tenant.tenant_id(), body.scope, body.history, request) {
        Ok(run) => (StatusCode::OK, Json(ForecastResponse::new(run, granularity))).into_response(),
        Err(e) => errors::forecast_error_to_response(e),
    }
}
