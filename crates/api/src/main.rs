use std::sync::Arc;

use anyhow::Context;

use truckplan_api::app::{self, services::AppServices};
use truckplan_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    truckplan_observability::init();

    let config = ApiConfig::from_env().context("invalid configuration")?;
    if config.dataset.is_none() {
        tracing::warn!("no dataset configured; tenants start empty until POST /datasets");
    }

    let services = AppServices::from_config(&config).context("failed to initialize services")?;
    let app = app::build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        default_horizon = config.default_horizon.weeks(),
        history_days = config.history_days,
        tenant_scope = ?config.tenant_scope,
        "listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
