//! MA4 forecast engine.
//!
//! Model:
//! - Group weekly history by (store, product) into week-ordered series.
//! - Baseline = mean of the last (up to) 4 weeks strictly before the target week.
//! - Band = baseline ± one sample standard deviation of the same window.
//! - Project the baseline over the horizon (total or per-week rate).
//!
//! Pure and stateless: no IO, no shared state, safe to call from many threads.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use truckplan_core::{ProductId, StoreNumber, WeekStart};

use crate::error::ForecastError;
use crate::model::{ForecastRow, Horizon, Projection, ScopeEntry, WeeklySalesFact, normalize_salesperson};
use crate::stats::{mean, stddev_sample};

/// Trailing window of the moving average.
pub const MA_WINDOW: usize = 4;

/// Model name reported with every run.
pub const MODEL_NAME: &str = "MA4";

/// Parameters of a single forecast run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub horizon: Horizon,
    pub target_week_start: WeekStart,
    #[serde(default)]
    pub projection: Projection,
}

impl ForecastRequest {
    /// Build a request with the default (horizon total) projection.
    ///
    /// `target_week_start` is floored to its Monday.
    pub fn new(horizon_weeks: u32, target_week_start: NaiveDate) -> Result<Self, ForecastError> {
        Ok(Self {
            horizon: Horizon::new(horizon_weeks)?,
            target_week_start: WeekStart::containing(target_week_start),
            projection: Projection::default(),
        })
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }
}

/// Result of a successful computation.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastOutcome {
    /// One row per deduplicated scope entry, in scope order.
    Rows(Vec<ForecastRow>),
    /// The scope was empty; nothing to forecast.
    EmptyScope,
}

impl ForecastOutcome {
    pub fn rows(&self) -> &[ForecastRow] {
        match self {
            ForecastOutcome::Rows(rows) => rows,
            ForecastOutcome::EmptyScope => &[],
        }
    }

    pub fn into_rows(self) -> Vec<ForecastRow> {
        match self {
            ForecastOutcome::Rows(rows) => rows,
            ForecastOutcome::EmptyScope => Vec::new(),
        }
    }

    pub fn is_empty_scope(&self) -> bool {
        matches!(self, ForecastOutcome::EmptyScope)
    }
}

/// Forecast every scope entry over `horizon_weeks` from `target_week_start`.
pub fn compute(
    scope: &[ScopeEntry],
    history: &[WeeklySalesFact],
    horizon_weeks: u32,
    target_week_start: NaiveDate,
) -> Result<ForecastOutcome, ForecastError> {
    let request = ForecastRequest::new(horizon_weeks, target_week_start)?;
    compute_with(&request, scope, history)
}

/// Same as [`compute`] with a fully specified request.
pub fn compute_with(
    request: &ForecastRequest,
    scope: &[ScopeEntry],
    history: &[WeeklySalesFact],
) -> Result<ForecastOutcome, ForecastError> {
    // Validate the whole history before producing anything.
    let series = group_history(history, request.target_week_start)?;

    let scope = dedup_scope(scope);
    if scope.is_empty() {
        warn!(target_week = %request.target_week_start, "empty forecast scope");
        return Ok(ForecastOutcome::EmptyScope);
    }

    let rows: Vec<ForecastRow> = scope
        .into_iter()
        .map(|entry| {
            let key = (entry.store_number.clone(), entry.product_id.clone());
            forecast_entry(entry, series.get(&key), request)
        })
        .collect();

    debug!(
        rows = rows.len(),
        series = series.len(),
        horizon = request.horizon.weeks(),
        projection = request.projection.label(),
        "computed MA4 forecast"
    );

    Ok(ForecastOutcome::Rows(rows))
}

/// Week-ordered quantities for one (store, product) pair.
#[derive(Debug, Default)]
struct Series {
    weeks: BTreeMap<WeekStart, f64>,
    product_name: Option<(WeekStart, String)>,
}

impl Series {
    /// The last (up to) `MA_WINDOW` weekly quantities.
    fn trailing_window(&self) -> Vec<f64> {
        let mut window: Vec<f64> = self.weeks.values().rev().take(MA_WINDOW).copied().collect();
        window.reverse();
        window
    }
}

fn group_history(
    history: &[WeeklySalesFact],
    target: WeekStart,
) -> Result<HashMap<(StoreNumber, ProductId), Series>, ForecastError> {
    let mut series: HashMap<(StoreNumber, ProductId), Series> = HashMap::new();

    for fact in history {
        if !(fact.quantity.is_finite() && fact.quantity >= 0.0) {
            return Err(ForecastError::malformed(
                fact.store_number.as_str(),
                fact.product_id.as_str(),
                format!("quantity must be a non-negative number, got {}", fact.quantity),
            ));
        }

        let week = WeekStart::new(fact.week_start_date).map_err(|e| {
            ForecastError::malformed(fact.store_number.as_str(), fact.product_id.as_str(), e.to_string())
        })?;

        let entry = series
            .entry((fact.store_number.clone(), fact.product_id.clone()))
            .or_default();

        if let Some(name) = fact.product_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            let newer = entry.product_name.as_ref().is_none_or(|(seen, _)| week >= *seen);
            if newer {
                entry.product_name = Some((week, name.to_string()));
            }
        }

        // Only weeks strictly before the target feed the baseline.
        if week < target {
            *entry.weeks.entry(week).or_insert(0.0) += fact.quantity;
        }
    }

    Ok(series)
}

fn dedup_scope(scope: &[ScopeEntry]) -> Vec<&ScopeEntry> {
    let mut seen = HashSet::new();
    scope.iter().filter(|entry| seen.insert(entry.key())).collect()
}

fn forecast_entry(entry: &ScopeEntry, series: Option<&Series>, request: &ForecastRequest) -> ForecastRow {
    let window = series.map(Series::trailing_window).unwrap_or_default();
    let baseline = mean(&window);
    let factor = request.projection.factor(request.horizon);
    let predicted = baseline * factor;

    let (lo, hi) = if window.len() < 2 {
        (predicted, predicted)
    } else {
        let sd = stddev_sample(&window, baseline);
        ((baseline - sd).max(0.0) * factor, (baseline + sd) * factor)
    };

    ForecastRow {
        salesperson: normalize_salesperson(&entry.salesperson),
        store_number: entry.store_number.clone(),
        chain_name: entry.chain_name.clone(),
        store_name: entry.store_name.clone(),
        product_id: entry.product_id.clone(),
        product_name: series.and_then(|s| s.product_name.as_ref().map(|(_, name)| name.clone())),
        baseline_cases: baseline,
        observations: window.len(),
        horizon: request.horizon,
        projection: request.projection,
        predicted_cases: predicted,
        predicted_cases_lo: lo,
        predicted_cases_hi: hi,
    }
}
