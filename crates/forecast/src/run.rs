use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use truckplan_core::{RunId, TenantId, WeekStart};

use crate::engine::{ForecastOutcome, ForecastRequest, MODEL_NAME};
use crate::model::{ForecastRow, Horizon, Projection};
use crate::summary::{SalespersonSummary, TruckLoad, summarize_by_salesperson, truck_load};

/// Output of one forecast run: detail rows plus their roll-ups.
///
/// Produced fresh per request and never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRun {
    pub run_id: RunId,
    pub tenant_id: TenantId,
    pub model_name: String,
    pub target_week_start: WeekStart,
    pub horizon: Horizon,
    pub projection: Projection,
    /// Column label of `predicted_cases` under `projection`.
    pub predicted_cases_basis: String,
    pub generated_at: DateTime<Utc>,
    pub empty_scope: bool,
    pub rows: Vec<ForecastRow>,
    pub summaries: Vec<SalespersonSummary>,
    pub truck_load: TruckLoad,

    /// Free-form metadata (input sizes, filters, timings, etc).
    #[serde(default)]
    pub metadata: JsonValue,
}

impl ForecastRun {
    pub fn from_outcome(tenant_id: TenantId, request: &ForecastRequest, outcome: ForecastOutcome) -> Self {
        let empty_scope = outcome.is_empty_scope();
        let rows = outcome.into_rows();
        let summaries = summarize_by_salesperson(&rows);
        let truck_load = truck_load(&rows, request);

        Self {
            run_id: RunId::new(),
            tenant_id,
            model_name: MODEL_NAME.to_string(),
            target_week_start: request.target_week_start,
            horizon: request.horizon,
            projection: request.projection,
            predicted_cases_basis: request.projection.label().to_string(),
            generated_at: Utc::now(),
            empty_scope,
            rows,
            summaries,
            truck_load,
            metadata: json!({}),
        }
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }

    /// Rows without any history behind them.
    pub fn rows_without_history(&self) -> usize {
        self.rows.iter().filter(|r| r.observations == 0).count()
    }
}
