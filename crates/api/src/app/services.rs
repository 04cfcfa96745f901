//! Service wiring: in-memory provider store + forecast scheduling.

use thiserror::Error;
use tracing::info;

use truckplan_core::TenantId;
use truckplan_forecast::{
    Dataset, ForecastError, ForecastRequest, ForecastRun, ForecastScheduler, Horizon, HistoryProvider,
    InMemoryStore, LocalScheduler, ProviderError, ScopeEntry, ScopeProvider, TenantScope, TruckPlanInput, TruckPlanJob,
    WeeklySalesFact,
};

use crate::config::{ApiConfig, ConfigError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Debug)]
pub struct AppServices {
    store: InMemoryStore,
    default_horizon: Horizon,
    scheduler: LocalScheduler,
}

impl AppServices {
    pub fn new(default_horizon: Horizon, history_days: i64) -> Self {
        Self {
            store: InMemoryStore::new().with_window_days(history_days),
            default_horizon,
            scheduler: LocalScheduler::new(TenantScope::Any),
        }
    }

    /// Restrict which tenants this process will forecast for.
    pub fn with_tenant_scope(mut self, scope: TenantScope) -> Self {
        self.scheduler = LocalScheduler::new(scope);
        self
    }

    /// Build services and preload the configured dataset, if any.
    pub fn from_config(config: &ApiConfig) -> Result<Self, ConfigError> {
        let services = Self::new(config.default_horizon, config.history_days).with_tenant_scope(config.tenant_scope);

        if let Some(source) = &config.dataset {
            let raw = std::fs::read_to_string(&source.path).map_err(|e| ConfigError::Io {
                path: source.path.clone(),
                source: e,
            })?;
            let dataset: Dataset = serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
                path: source.path.clone(),
                source: e,
            })?;
            let (scope_entries, history_facts) =
                services
                    .store
                    .load(source.tenant_id, dataset)
                    .map_err(|e| ConfigError::Invalid {
                        var: crate::config::DATA_PATH_ENV,
                        reason: e.to_string(),
                    })?;
            info!(
                tenant_id = %source.tenant_id,
                path = %source.path.display(),
                scope_entries,
                history_facts,
                "preloaded dataset"
            );
        }

        Ok(services)
    }

    pub fn default_horizon(&self) -> Horizon {
        self.default_horizon
    }

    pub fn load_dataset(&self, tenant_id: TenantId, dataset: Dataset) -> Result<(usize, usize), ProviderError> {
        self.store.load(tenant_id, dataset)
    }

    pub fn salespeople(&self, tenant_id: TenantId) -> Result<Vec<String>, ProviderError> {
        self.store.salespeople(tenant_id)
    }

    /// Forecast from the tenant's stored scope and history.
    pub fn plan(
        &self,
        tenant_id: TenantId,
        salesperson: Option<String>,
        request: ForecastRequest,
    ) -> Result<ForecastRun, ServiceError> {
        let scope = self.store.scope(tenant_id, salesperson.as_deref())?;
        let history = self
            .store
            .weekly_history(tenant_id, &scope, request.target_week_start.date())?;

        let job = TruckPlanJob::new(tenant_id, TruckPlanInput { scope, history, request }).with_salesperson(salesperson);
        Ok(self.scheduler.run(job)?)
    }

    /// Forecast from caller-supplied scope and history.
    pub fn plan_inline(
        &self,
        tenant_id: TenantId,
        scope: Vec<ScopeEntry>,
        history: Vec<WeeklySalesFact>,
        request: ForecastRequest,
    ) -> Result<ForecastRun, ForecastError> {
        let job = TruckPlanJob::new(tenant_id, TruckPlanInput { scope, history, request });
        self.scheduler.run(job)
    }
}
