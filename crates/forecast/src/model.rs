use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use truckplan_core::{ProductId, StoreNumber, ValueObject, WeekStart};

use crate::error::ForecastError;

/// One (salesperson, store, product) combination eligible for forecasting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeEntry {
    pub salesperson: String,
    pub store_number: StoreNumber,
    pub chain_name: String,
    #[serde(default)]
    pub store_name: String,
    pub product_id: ProductId,
}

/// Canonical salesperson name: trimmed and upper-cased.
///
/// Inner spacing is kept as-is, so "NON  BUY" and "NON BUY" are different routes.
pub fn normalize_salesperson(name: &str) -> String {
    name.trim().to_uppercase()
}

impl ScopeEntry {
    /// Uniqueness key within a scope set, on the canonical salesperson name.
    pub fn key(&self) -> (String, &StoreNumber, &ProductId) {
        (normalize_salesperson(&self.salesperson), &self.store_number, &self.product_id)
    }
}

/// Observed sales of one product at one store for one week.
///
/// `week_start_date` is kept as a raw date here; the engine rejects facts
/// that are not Monday-aligned instead of silently re-bucketing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklySalesFact {
    pub store_number: StoreNumber,
    pub product_id: ProductId,
    pub week_start_date: NaiveDate,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

/// Number of future weeks to project (1..=4).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Horizon(u8);

impl Horizon {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 4;

    pub fn new(weeks: u32) -> Result<Self, ForecastError> {
        if !(Self::MIN..=Self::MAX).contains(&weeks) {
            return Err(ForecastError::InvalidHorizon { requested: weeks });
        }
        Ok(Self(weeks as u8))
    }

    pub fn weeks(&self) -> u32 {
        u32::from(self.0)
    }
}

impl TryFrom<u32> for Horizon {
    type Error = ForecastError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Horizon> for u32 {
    fn from(value: Horizon) -> Self {
        value.weeks()
    }
}

impl ValueObject for Horizon {}

/// How the weekly baseline is projected over the horizon.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// `predicted_cases` is the sum over all horizon weeks.
    #[default]
    HorizonTotal,
    /// `predicted_cases` is the per-week rate, identical for every horizon week.
    WeeklyRate,
}

impl Projection {
    /// Output column label for the predicted quantity under this projection.
    pub fn label(&self) -> &'static str {
        match self {
            Projection::HorizonTotal => "predicted_cases_total",
            Projection::WeeklyRate => "predicted_cases_per_week",
        }
    }

    /// Multiplier applied to the weekly baseline.
    pub fn factor(&self, horizon: Horizon) -> f64 {
        match self {
            Projection::HorizonTotal => f64::from(horizon.weeks()),
            Projection::WeeklyRate => 1.0,
        }
    }
}

impl core::str::FromStr for Projection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "horizon_total" | "total" => Ok(Projection::HorizonTotal),
            "weekly_rate" | "weekly" => Ok(Projection::WeeklyRate),
            other => Err(format!(
                "unknown projection '{other}', expected horizon_total or weekly_rate"
            )),
        }
    }
}

/// Forecast for one scope entry over the whole horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub salesperson: String,
    pub store_number: StoreNumber,
    pub chain_name: String,
    pub store_name: String,
    pub product_id: ProductId,
    pub product_name: Option<String>,
    /// MA4 weekly baseline the prediction was projected from.
    pub baseline_cases: f64,
    /// Number of weekly observations behind the baseline (0..=4).
    pub observations: usize,
    pub horizon: Horizon,
    pub projection: Projection,
    pub predicted_cases: f64,
    pub predicted_cases_lo: f64,
    pub predicted_cases_hi: f64,
}

/// One horizon week of a [`ForecastRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub horizon_week: u32,
    pub week_start: WeekStart,
    pub predicted_cases: f64,
    pub predicted_cases_lo: f64,
    pub predicted_cases_hi: f64,
}

impl ForecastRow {
    /// Expand the row into one bucket per horizon week.
    ///
    /// Each bucket carries the weekly rate; the baseline is not recomputed
    /// per week.
    pub fn weekly_buckets(&self, target_week_start: WeekStart) -> Vec<WeeklyBucket> {
        let factor = self.projection.factor(self.horizon);
        (1..=self.horizon.weeks())
            .map(|h| WeeklyBucket {
                horizon_week: h,
                week_start: target_week_start.plus_weeks(i64::from(h) - 1),
                predicted_cases: self.predicted_cases / factor,
                predicted_cases_lo: self.predicted_cases_lo / factor,
                predicted_cases_hi: self.predicted_cases_hi / factor,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monday() -> WeekStart {
        WeekStart::new(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()).unwrap()
    }

    fn row(projection: Projection, horizon: u32, predicted: f64) -> ForecastRow {
        ForecastRow {
            salesperson: "A".to_string(),
            store_number: StoreNumber::parse("100").unwrap(),
            chain_name: "CHAIN".to_string(),
            store_name: String::new(),
            product_id: ProductId::parse("UPC1").unwrap(),
            product_name: None,
            baseline_cases: 10.0,
            observations: 4,
            horizon: Horizon::new(horizon).unwrap(),
            projection,
            predicted_cases: predicted,
            predicted_cases_lo: predicted / 2.0,
            predicted_cases_hi: predicted * 2.0,
        }
    }

    #[test]
    fn horizon_accepts_one_through_four() {
        for h in 1..=4 {
            assert_eq!(Horizon::new(h).unwrap().weeks(), h);
        }
        assert_eq!(
            Horizon::new(0).unwrap_err(),
            ForecastError::InvalidHorizon { requested: 0 }
        );
        assert_eq!(
            Horizon::new(5).unwrap_err(),
            ForecastError::InvalidHorizon { requested: 5 }
        );
    }

    #[test]
    fn projection_labels_name_the_basis() {
        assert_eq!(Projection::HorizonTotal.label(), "predicted_cases_total");
        assert_eq!(Projection::WeeklyRate.label(), "predicted_cases_per_week");
        assert_eq!("weekly".parse::<Projection>().unwrap(), Projection::WeeklyRate);
        assert!("daily".parse::<Projection>().is_err());
    }

    #[test]
    fn horizon_total_buckets_split_the_total_evenly() {
        let buckets = row(Projection::HorizonTotal, 4, 40.0).weekly_buckets(monday());
        assert_eq!(buckets.len(), 4);
        for (i, b) in buckets.iter().enumerate() {
            assert_eq!(b.horizon_week, i as u32 + 1);
            assert_eq!(b.week_start, monday().plus_weeks(i as i64));
            assert_eq!(b.predicted_cases, 10.0);
            assert_eq!(b.predicted_cases_lo, 5.0);
            assert_eq!(b.predicted_cases_hi, 20.0);
        }
    }

    #[test]
    fn weekly_rate_buckets_repeat_the_rate() {
        let buckets = row(Projection::WeeklyRate, 2, 10.0).weekly_buckets(monday());
        assert_eq!(buckets.len(), 2);
        assert!(buckets.iter().all(|b| b.predicted_cases == 10.0));
    }

    #[test]
    fn horizon_deserialization_is_range_checked() {
        assert!(serde_json::from_str::<Horizon>("3").is_ok());
        assert!(serde_json::from_str::<Horizon>("9").is_err());
    }
}
