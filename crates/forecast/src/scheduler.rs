use truckplan_core::TenantId;

use crate::error::ForecastError;
use crate::job::ForecastJob;
use crate::run::ForecastRun;

/// Tenant scope for execution.
///
/// - `Any`: run jobs for any tenant (shared workers).
/// - `Tenant`: only accept jobs for the specified tenant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TenantScope {
    Any,
    Tenant(TenantId),
}

impl TenantScope {
    pub fn allows(&self, tenant_id: TenantId) -> bool {
        match self {
            TenantScope::Any => true,
            TenantScope::Tenant(t) => *t == tenant_id,
        }
    }
}

/// Executor for forecast jobs.
pub trait ForecastScheduler: Send + Sync + 'static {
    fn scope(&self) -> TenantScope;

    fn run<J: ForecastJob>(&self, job: J) -> Result<ForecastRun, ForecastError> {
        if !self.scope().allows(job.tenant_id()) {
            return Err(ForecastError::TenantScope(format!(
                "job tenant {} not allowed by scheduler",
                job.tenant_id()
            )));
        }
        job.run()
    }
}

/// Synchronous scheduler that runs jobs immediately on the calling thread.
#[derive(Debug, Copy, Clone)]
pub struct LocalScheduler {
    scope: TenantScope,
}

impl LocalScheduler {
    pub fn new(scope: TenantScope) -> Self {
        Self { scope }
    }

    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self::new(TenantScope::Tenant(tenant_id))
    }
}

impl ForecastScheduler for LocalScheduler {
    fn scope(&self) -> TenantScope {
        self.scope
    }
}
