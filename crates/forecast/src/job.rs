use serde_json::json;
use tracing::info;

use truckplan_core::TenantId;

use crate::engine::{ForecastRequest, compute_with};
use crate::error::ForecastError;
use crate::model::{ScopeEntry, WeeklySalesFact};
use crate::run::ForecastRun;

/// A tenant-scoped forecast unit.
///
/// Jobs receive their data via their `Input` type; fetching it is the
/// caller's concern (providers, HTTP bodies, fixtures).
pub trait ForecastJob: Send + Sync + 'static {
    type Input: Send + Sync + 'static;

    /// The tenant this job belongs to (tenant-safe execution model).
    fn tenant_id(&self) -> TenantId;

    /// The input snapshot the job will forecast from.
    fn input(&self) -> &Self::Input;

    /// Execute the forecast.
    fn run(&self) -> Result<ForecastRun, ForecastError>;
}

/// Scope, history and parameters of a truck plan.
#[derive(Debug, Clone)]
pub struct TruckPlanInput {
    pub scope: Vec<ScopeEntry>,
    pub history: Vec<WeeklySalesFact>,
    pub request: ForecastRequest,
}

/// MA4 truck plan for one tenant.
#[derive(Debug, Clone)]
pub struct TruckPlanJob {
    tenant_id: TenantId,
    input: TruckPlanInput,
    salesperson: Option<String>,
}

impl TruckPlanJob {
    pub fn new(tenant_id: TenantId, input: TruckPlanInput) -> Self {
        Self {
            tenant_id,
            input,
            salesperson: None,
        }
    }

    /// Record the salesperson filter the scope was fetched with.
    pub fn with_salesperson(mut self, salesperson: Option<String>) -> Self {
        self.salesperson = salesperson;
        self
    }
}

impl ForecastJob for TruckPlanJob {
    type Input = TruckPlanInput;

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    fn input(&self) -> &Self::Input {
        &self.input
    }

    fn run(&self) -> Result<ForecastRun, ForecastError> {
        let request = &self.input.request;
        let outcome = compute_with(request, &self.input.scope, &self.input.history)?;

        let run = ForecastRun::from_outcome(self.tenant_id, request, outcome).with_metadata(json!({
            "kind": "forecast.truck_plan",
            "salesperson": self.salesperson,
            "scope_entries": self.input.scope.len(),
            "history_facts": self.input.history.len(),
        }));

        info!(
            tenant_id = %self.tenant_id,
            run_id = %run.run_id,
            rows = run.rows.len(),
            without_history = run.rows_without_history(),
            total_cases = run.truck_load.total_cases,
            empty_scope = run.empty_scope,
            "truck plan computed"
        );

        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use truckplan_core::{ProductId, StoreNumber};

    use crate::model::Projection;

    fn input(scope: Vec<ScopeEntry>) -> TruckPlanInput {
        let target = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let request = ForecastRequest::new(2, target).unwrap();
        let history = vec![WeeklySalesFact {
            store_number: StoreNumber::parse("100").unwrap(),
            product_id: ProductId::parse("UPC1").unwrap(),
            week_start_date: NaiveDate::from_ymd_opt(2024, 5, 27).unwrap(),
            quantity: 6.0,
            product_name: Some("Seltzer 8pk".to_string()),
        }];
        TruckPlanInput { scope, history, request }
    }

    fn scope() -> Vec<ScopeEntry> {
        vec![
            ScopeEntry {
                salesperson: "ALICE".to_string(),
                store_number: StoreNumber::parse("100").unwrap(),
                chain_name: "ALDI".to_string(),
                store_name: "Aldi #100".to_string(),
                product_id: ProductId::parse("UPC1").unwrap(),
            },
            ScopeEntry {
                salesperson: "ALICE".to_string(),
                store_number: StoreNumber::parse("100").unwrap(),
                chain_name: "ALDI".to_string(),
                store_name: "Aldi #100".to_string(),
                product_id: ProductId::parse("UPC9").unwrap(),
            },
        ]
    }

    #[test]
    fn run_carries_rows_summaries_and_truck_load() {
        let tenant = TenantId::new();
        let run = TruckPlanJob::new(tenant, input(scope()))
            .with_salesperson(Some("ALICE".to_string()))
            .run()
            .unwrap();

        assert_eq!(run.tenant_id, tenant);
        assert_eq!(run.model_name, "MA4");
        assert_eq!(run.projection, Projection::HorizonTotal);
        assert_eq!(run.predicted_cases_basis, "predicted_cases_total");
        assert!(!run.empty_scope);
        assert_eq!(run.rows.len(), 2);
        assert_eq!(run.rows_without_history(), 1);
        assert_eq!(run.rows[0].product_name.as_deref(), Some("Seltzer 8pk"));
        assert_eq!(run.summaries.len(), 1);
        assert_eq!(run.summaries[0].total_cases, 12.0);
        assert_eq!(run.summaries[0].skus, 2);
        assert_eq!(run.truck_load.total_cases, 12.0);
        assert_eq!(run.metadata["salesperson"], "ALICE");
        assert_eq!(run.metadata["scope_entries"], 2);
    }

    #[test]
    fn empty_scope_run_is_flagged() {
        let run = TruckPlanJob::new(TenantId::new(), input(Vec::new())).run().unwrap();
        assert!(run.empty_scope);
        assert!(run.rows.is_empty());
        assert!(run.summaries.is_empty());
        assert_eq!(run.truck_load.weeks.len(), 2);
    }

    #[test]
    fn malformed_history_fails_the_job() {
        let mut data = input(scope());
        data.history[0].quantity = -1.0;
        let err = TruckPlanJob::new(TenantId::new(), data).run().unwrap_err();
        assert!(matches!(err, ForecastError::MalformedHistory { .. }));
    }
}
