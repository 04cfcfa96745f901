use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use truckplan_forecast::{ForecastError, ProviderError};

use crate::app::services::ServiceError;

pub fn forecast_error_to_response(err: ForecastError) -> axum::response::Response {
    match err {
        ForecastError::InvalidHorizon { .. } => {
            json_error(StatusCode::BAD_REQUEST, "invalid_horizon", err.to_string())
        }
        ForecastError::MalformedHistory { .. } => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "malformed_history", err.to_string())
        }
        ForecastError::TenantScope(msg) => json_error(StatusCode::FORBIDDEN, "tenant_scope", msg),
    }
}

pub fn provider_error_to_response(err: ProviderError) -> axum::response::Response {
    match err {
        ProviderError::Unavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "provider_unavailable", msg)
        }
        ProviderError::Domain(e) => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Forecast(e) => forecast_error_to_response(e),
        ServiceError::Provider(e) => provider_error_to_response(e),
    }
}

/// Malformed or undeserializable request bodies, keeping axum's status code.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn query_rejection_to_response(rejection: QueryRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_query", rejection.body_text())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
