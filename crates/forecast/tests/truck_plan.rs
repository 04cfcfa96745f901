use chrono::NaiveDate;

use truckplan_core::{ProductId, StoreNumber, TenantId, WeekStart};
use truckplan_forecast::{
    Dataset, ForecastError, ForecastRequest, ForecastScheduler, HistoryProvider, InMemoryStore, LocalScheduler,
    Projection, ScopeEntry, ScopeProvider, TruckPlanInput, TruckPlanJob, WeeklySalesFact, compute,
};

fn target() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
}

fn week(offset: i64) -> NaiveDate {
    WeekStart::new(target()).unwrap().plus_weeks(offset).date()
}

fn entry(salesperson: &str, store: &str, product: &str) -> ScopeEntry {
    ScopeEntry {
        salesperson: salesperson.to_string(),
        store_number: StoreNumber::parse(store).unwrap(),
        chain_name: "WINN-DIXIE".to_string(),
        store_name: format!("WD {store}"),
        product_id: ProductId::parse(product).unwrap(),
    }
}

fn fact(store: &str, product: &str, offset: i64, quantity: f64) -> WeeklySalesFact {
    WeeklySalesFact {
        store_number: StoreNumber::parse(store).unwrap(),
        product_id: ProductId::parse(product).unwrap(),
        week_start_date: week(offset),
        quantity,
        product_name: None,
    }
}

#[test]
fn worked_example_from_rising_sales() {
    let scope = vec![entry("A", "100", "UPC1")];
    let history = vec![
        fact("100", "UPC1", -4, 10.0),
        fact("100", "UPC1", -3, 20.0),
        fact("100", "UPC1", -2, 30.0),
        fact("100", "UPC1", -1, 40.0),
    ];

    let outcome = compute(&scope, &history, 1, target()).unwrap();
    let row = &outcome.rows()[0];
    assert_eq!(row.predicted_cases, 25.0);
    assert!(row.predicted_cases_lo < 25.0 && 25.0 < row.predicted_cases_hi);

    let empty = compute(&scope, &[], 1, target()).unwrap();
    assert_eq!(empty.rows().len(), 1);
    assert_eq!(empty.rows()[0].predicted_cases, 0.0);
    assert_eq!(empty.rows()[0].predicted_cases_lo, 0.0);
    assert_eq!(empty.rows()[0].predicted_cases_hi, 0.0);
}

#[test]
fn provider_backed_plan_for_one_route() {
    let tenant = TenantId::new();
    let store = InMemoryStore::new();
    store
        .load(
            tenant,
            Dataset {
                scope: vec![
                    entry("ALICE", "100", "UPC1"),
                    entry("ALICE", "100", "UPC2"),
                    entry("BOB", "200", "UPC1"),
                ],
                history: vec![
                    fact("100", "UPC1", -2, 8.0),
                    fact("100", "UPC1", -1, 12.0),
                    // Older than the 90-day window; must not reach the engine.
                    fact("100", "UPC2", -20, 500.0),
                    fact("200", "UPC1", -1, 3.0),
                ],
                daily: Vec::new(),
            },
        )
        .unwrap();

    let scope = store.scope(tenant, Some("alice")).unwrap();
    let history = store.weekly_history(tenant, &scope, target()).unwrap();
    let request = ForecastRequest::new(2, target()).unwrap().with_projection(Projection::WeeklyRate);

    let run = LocalScheduler::for_tenant(tenant)
        .run(TruckPlanJob::new(tenant, TruckPlanInput { scope, history, request }))
        .unwrap();

    assert_eq!(run.rows.len(), 2);
    assert_eq!(run.rows[0].predicted_cases, 10.0);
    assert_eq!(run.rows[1].predicted_cases, 0.0);
    assert_eq!(run.predicted_cases_basis, "predicted_cases_per_week");
    assert_eq!(run.summaries.len(), 1);
    assert_eq!(run.summaries[0].salesperson, "ALICE");
    assert_eq!(run.truck_load.total_cases, 20.0);
}

#[test]
fn foreign_tenant_job_is_refused() {
    let request = ForecastRequest::new(1, target()).unwrap();
    let job = TruckPlanJob::new(
        TenantId::new(),
        TruckPlanInput {
            scope: vec![entry("A", "100", "UPC1")],
            history: Vec::new(),
            request,
        },
    );

    let err = LocalScheduler::for_tenant(TenantId::new()).run(job).unwrap_err();
    assert!(matches!(err, ForecastError::TenantScope(_)));
}

#[test]
fn one_route_spelled_two_ways_is_loaded_once() {
    let tenant = TenantId::new();
    let store = InMemoryStore::new();
    store
        .load(
            tenant,
            Dataset {
                scope: vec![entry("Alice Smith", "100", "UPC1"), entry("ALICE SMITH ", "100", "UPC1")],
                history: vec![fact("100", "UPC1", -1, 10.0)],
                daily: Vec::new(),
            },
        )
        .unwrap();

    assert_eq!(store.salespeople(tenant).unwrap(), vec!["ALICE SMITH"]);

    let scope = store.scope(tenant, Some("alice smith")).unwrap();
    let history = store.weekly_history(tenant, &scope, target()).unwrap();
    let request = ForecastRequest::new(1, target()).unwrap();
    let run = LocalScheduler::for_tenant(tenant)
        .run(TruckPlanJob::new(tenant, TruckPlanInput { scope, history, request }))
        .unwrap();

    assert_eq!(run.rows.len(), 1);
    assert_eq!(run.summaries.len(), 1);
    assert_eq!(run.summaries[0].salesperson, "ALICE SMITH");
    assert_eq!(run.summaries[0].total_cases, 10.0);
    assert_eq!(run.truck_load.total_cases, 10.0);
}
