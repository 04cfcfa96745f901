//! Roll-ups of forecast detail rows.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use truckplan_core::WeekStart;

use crate::engine::ForecastRequest;
use crate::model::ForecastRow;
use crate::stats::round2;

/// Per-salesperson totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalespersonSummary {
    pub salesperson: String,
    /// Sum of `predicted_cases` over the salesperson's rows.
    pub total_cases: f64,
    /// Distinct stores on the route.
    pub stores: usize,
    /// Distinct products on the route.
    pub skus: usize,
}

/// Cases to load for one horizon week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyLoad {
    pub horizon_week: u32,
    pub week_start: WeekStart,
    pub cases: f64,
}

/// Total truck load across all rows, per week and over the horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckLoad {
    pub weeks: Vec<WeeklyLoad>,
    pub total_cases: f64,
}

pub fn summarize_by_salesperson(rows: &[ForecastRow]) -> Vec<SalespersonSummary> {
    #[derive(Default)]
    struct Acc<'a> {
        total: f64,
        stores: BTreeSet<&'a str>,
        skus: BTreeSet<&'a str>,
    }

    let mut by_salesperson: BTreeMap<&str, Acc<'_>> = BTreeMap::new();
    for row in rows {
        let acc = by_salesperson.entry(row.salesperson.as_str()).or_default();
        acc.total += row.predicted_cases;
        acc.stores.insert(row.store_number.as_str());
        acc.skus.insert(row.product_id.as_str());
    }

    by_salesperson
        .into_iter()
        .map(|(salesperson, acc)| SalespersonSummary {
            salesperson: salesperson.to_string(),
            total_cases: round2(acc.total),
            stores: acc.stores.len(),
            skus: acc.skus.len(),
        })
        .collect()
}

/// Sum the weekly buckets of every row into a truck load.
///
/// The week list always spans the requested horizon, even with no rows.
pub fn truck_load(rows: &[ForecastRow], request: &ForecastRequest) -> TruckLoad {
    let mut weeks: Vec<WeeklyLoad> = (1..=request.horizon.weeks())
        .map(|h| WeeklyLoad {
            horizon_week: h,
            week_start: request.target_week_start.plus_weeks(i64::from(h) - 1),
            cases: 0.0,
        })
        .collect();

    for row in rows {
        for bucket in row.weekly_buckets(request.target_week_start) {
            if let Some(load) = weeks.get_mut(bucket.horizon_week as usize - 1) {
                load.cases += bucket.predicted_cases;
            }
        }
    }

    let total: f64 = weeks.iter().map(|w| w.cases).sum();
    for load in &mut weeks {
        load.cases = round2(load.cases);
    }

    TruckLoad {
        weeks,
        total_cases: round2(total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::engine::compute_with;
    use crate::model::{Projection, ScopeEntry, WeeklySalesFact};
    use truckplan_core::{ProductId, StoreNumber};

    fn request(h: u32) -> ForecastRequest {
        ForecastRequest::new(h, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()).unwrap()
    }

    fn entry(salesperson: &str, store: &str, product: &str) -> ScopeEntry {
        ScopeEntry {
            salesperson: salesperson.to_string(),
            store_number: StoreNumber::parse(store).unwrap(),
            chain_name: "PUBLIX".to_string(),
            store_name: String::new(),
            product_id: ProductId::parse(product).unwrap(),
        }
    }

    fn last_week(req: &ForecastRequest, store: &str, product: &str, quantity: f64) -> WeeklySalesFact {
        WeeklySalesFact {
            store_number: StoreNumber::parse(store).unwrap(),
            product_id: ProductId::parse(product).unwrap(),
            week_start_date: req.target_week_start.plus_weeks(-1).date(),
            quantity,
            product_name: None,
        }
    }

    fn rows(req: &ForecastRequest) -> Vec<ForecastRow> {
        let scope = vec![
            entry("ALICE", "100", "UPC1"),
            entry("ALICE", "100", "UPC2"),
            entry("ALICE", "200", "UPC1"),
            entry("BOB", "300", "UPC3"),
        ];
        let history = vec![
            last_week(req, "100", "UPC1", 2.0),
            last_week(req, "100", "UPC2", 3.0),
            last_week(req, "200", "UPC1", 5.0),
            last_week(req, "300", "UPC3", 1.5),
        ];
        compute_with(req, &scope, &history).unwrap().into_rows()
    }

    #[test]
    fn summaries_count_distinct_stores_and_skus() {
        let req = request(2);
        let summaries = summarize_by_salesperson(&rows(&req));

        assert_eq!(summaries.len(), 2);
        assert_eq!(
            summaries[0],
            SalespersonSummary {
                salesperson: "ALICE".to_string(),
                total_cases: 20.0,
                stores: 2,
                skus: 2,
            }
        );
        assert_eq!(summaries[1].salesperson, "BOB");
        assert_eq!(summaries[1].total_cases, 3.0);
        assert_eq!(summaries[1].stores, 1);
        assert_eq!(summaries[1].skus, 1);
    }

    #[test]
    fn summaries_of_nothing_are_empty() {
        assert!(summarize_by_salesperson(&[]).is_empty());
    }

    #[test]
    fn truck_load_spreads_totals_over_weeks() {
        let req = request(4);
        let load = truck_load(&rows(&req), &req);

        assert_eq!(load.weeks.len(), 4);
        for (i, week) in load.weeks.iter().enumerate() {
            assert_eq!(week.horizon_week, i as u32 + 1);
            assert_eq!(week.week_start, req.target_week_start.plus_weeks(i as i64));
            assert_eq!(week.cases, 11.5);
        }
        assert_eq!(load.total_cases, 46.0);
    }

    #[test]
    fn truck_load_is_independent_of_projection() {
        let total = request(3);
        let weekly = request(3).with_projection(Projection::WeeklyRate);
        assert_eq!(truck_load(&rows(&total), &total), truck_load(&rows(&weekly), &weekly));
    }

    #[test]
    fn empty_truck_load_still_lists_weeks() {
        let req = request(2);
        let load = truck_load(&[], &req);
        assert_eq!(load.weeks.len(), 2);
        assert_eq!(load.total_cases, 0.0);
    }
}
