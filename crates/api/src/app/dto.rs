use axum::http::StatusCode;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use truckplan_core::{ProductId, StoreNumber, WeekStart};
use truckplan_forecast::{
    ForecastRequest, ForecastRun, Horizon, Projection, ScopeEntry, WeeklySalesFact,
};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /forecasts`.
#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub salesperson: Option<String>,
    /// `YYYY-MM-DD`; floored to its Monday. Defaults to the current week.
    pub target_week: Option<String>,
    pub horizon: Option<u32>,
    pub projection: Option<String>,
    pub granularity: Option<String>,
}

/// Body of `POST /forecasts`.
#[derive(Debug, Deserialize)]
pub struct InlineForecastRequest {
    pub scope: Vec<ScopeEntry>,
    #[serde(default)]
    pub history: Vec<WeeklySalesFact>,
    pub horizon_weeks: Option<u32>,
    pub target_week_start: Option<NaiveDate>,
    pub projection: Option<Projection>,
    pub granularity: Option<String>,
}

/// Detail granularity of a forecast response.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Granularity {
    /// One row per (salesperson, store, product) for the whole horizon.
    #[default]
    Horizon,
    /// Additionally expand every row into its horizon weeks.
    Weekly,
}

pub fn parse_granularity(raw: Option<&str>) -> Result<Granularity, axum::response::Response> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("horizon") => Ok(Granularity::Horizon),
        Some("weekly") => Ok(Granularity::Weekly),
        Some(_) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_granularity",
            "granularity must be one of: horizon, weekly",
        )),
    }
}

pub fn parse_projection(raw: Option<&str>) -> Result<Projection, axum::response::Response> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Projection::default()),
        Some(s) => s
            .parse::<Projection>()
            .map_err(|msg| errors::json_error(StatusCode::BAD_REQUEST, "invalid_projection", msg)),
    }
}

pub fn parse_target_week(raw: Option<&str>) -> Result<NaiveDate, axum::response::Response> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(current_week()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_target_week",
                format!("target_week must be YYYY-MM-DD: {e}"),
            )
        }),
    }
}

/// Monday of the current (UTC) week.
pub fn current_week() -> NaiveDate {
    WeekStart::containing(Utc::now().date_naive()).date()
}

pub fn build_request(
    horizon: Option<u32>,
    default_horizon: Horizon,
    target_week: NaiveDate,
    projection: Projection,
) -> Result<ForecastRequest, axum::response::Response> {
    let weeks = horizon.unwrap_or(default_horizon.weeks());
    ForecastRequest::new(weeks, target_week)
        .map(|r| r.with_projection(projection))
        .map_err(crate::app::errors::forecast_error_to_response)
}

// -------------------------
// Response DTOs
// -------------------------

/// One horizon week of one detail row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyDetailRow {
    pub salesperson: String,
    pub store_number: StoreNumber,
    pub product_id: ProductId,
    pub horizon_week: u32,
    pub week_start: WeekStart,
    pub predicted_cases: f64,
    pub predicted_cases_lo: f64,
    pub predicted_cases_hi: f64,
}

#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    #[serde(flatten)]
    pub run: ForecastRun,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly: Option<Vec<WeeklyDetailRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ForecastResponse {
    pub fn new(run: ForecastRun, granularity: Granularity) -> Self {
        let weekly = match granularity {
            Granularity::Horizon => None,
            Granularity::Weekly => Some(weekly_detail(&run)),
        };
        let warning = run
            .empty_scope
            .then(|| "no scope entries matched; nothing to forecast".to_string());
        Self { run, weekly, warning }
    }
}

fn weekly_detail(run: &ForecastRun) -> Vec<WeeklyDetailRow> {
    run.rows
        .iter()
        .flat_map(|row| {
            row.weekly_buckets(run.target_week_start)
                .into_iter()
                .map(move |bucket| WeeklyDetailRow {
                    salesperson: row.salesperson.clone(),
                    store_number: row.store_number.clone(),
                    product_id: row.product_id.clone(),
                    horizon_week: bucket.horizon_week,
                    week_start: bucket.week_start,
                    predicted_cases: bucket.predicted_cases,
                    predicted_cases_lo: bucket.predicted_cases_lo,
                    predicted_cases_hi: bucket.predicted_cases_hi,
                })
        })
        .collect()
}
