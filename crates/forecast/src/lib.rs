//! `truckplan-forecast`
//!
//! **Responsibility:** MA4 sales forecasting for route scope.
//!
//! - The engine is pure: scope and history come in, forecast rows go out.
//! - Providers fetch inputs; the engine never performs IO.
//! - Runs are computed per request and never persisted here.

pub mod engine;
pub mod error;
pub mod job;
pub mod model;
pub mod provider;
pub mod run;
pub mod scheduler;
pub mod stats;
pub mod summary;

pub use engine::{ForecastOutcome, ForecastRequest, MA_WINDOW, MODEL_NAME, compute, compute_with};
pub use error::{ForecastError, ProviderError};
pub use job::{ForecastJob, TruckPlanInput, TruckPlanJob};
pub use model::{
    ForecastRow, Horizon, Projection, ScopeEntry, WeeklyBucket, WeeklySalesFact, normalize_salesperson,
};
pub use provider::{
    DailySale, Dataset, HISTORY_WINDOW_DAYS, HistoryProvider, InMemoryStore, ScopeProvider, weekly_rollup,
};
pub use run::ForecastRun;
pub use scheduler::{ForecastScheduler, LocalScheduler, TenantScope};
pub use summary::{SalespersonSummary, TruckLoad, WeeklyLoad, summarize_by_salesperson, truck_load};
