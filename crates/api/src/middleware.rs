use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use truckplan_core::TenantId;

use crate::app::errors::json_error;
use crate::context::TenantContext;

/// Header carrying the caller's tenant. Session resolution happens upstream.
pub const TENANT_HEADER: &str = "x-tenant-id";

pub async fn tenant_middleware(mut req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let tenant_id = match extract_tenant(req.headers()) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    req.extensions_mut().insert(TenantContext::new(tenant_id));

    next.run(req).await
}

fn extract_tenant(headers: &HeaderMap) -> Result<TenantId, Response> {
    let header = headers.get(TENANT_HEADER).ok_or_else(|| {
        json_error(
            StatusCode::UNAUTHORIZED,
            "missing_tenant",
            format!("{TENANT_HEADER} header is required"),
        )
    })?;

    let raw = header
        .to_str()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_tenant", "tenant header is not ASCII"))?;

    raw.trim()
        .parse::<TenantId>()
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, "invalid_tenant", e.to_string()))
}
