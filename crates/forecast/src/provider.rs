//! Scope and history providers.
//!
//! The engine never fetches data itself: providers hand it the scope and a
//! windowed weekly history. A warehouse-backed provider lives outside this
//! crate; [`InMemoryStore`] backs tests, dev, and preloaded datasets.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::RwLock;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use truckplan_core::{ProductId, StoreNumber, TenantId, WeekStart};

use crate::error::ProviderError;
use crate::model::{ScopeEntry, WeeklySalesFact, normalize_salesperson};

/// Days of history handed to the engine before the as-of date.
pub const HISTORY_WINDOW_DAYS: i64 = 90;

/// Salesperson buckets that are not real routes.
pub const NON_ROUTE_SALESPEOPLE: [&str; 2] = ["NON BUY", "NEW ACCOUNTS"];

/// Source of forecast scope (salesperson → store → product associations).
pub trait ScopeProvider: Send + Sync + 'static {
    /// Scope for a tenant, optionally narrowed to one salesperson.
    fn scope(&self, tenant_id: TenantId, salesperson: Option<&str>) -> Result<Vec<ScopeEntry>, ProviderError>;

    /// Distinct route salespeople for a tenant, canonicalized and sorted.
    fn salespeople(&self, tenant_id: TenantId) -> Result<Vec<String>, ProviderError>;
}

/// Source of weekly sales history.
pub trait HistoryProvider: Send + Sync + 'static {
    /// Weekly facts for the (store, product) pairs of `scope`, windowed to
    /// the provider's history window before `as_of`.
    fn weekly_history(
        &self,
        tenant_id: TenantId,
        scope: &[ScopeEntry],
        as_of: NaiveDate,
    ) -> Result<Vec<WeeklySalesFact>, ProviderError>;
}

/// Whether `name` is an actual route (non-blank, not an admin bucket).
pub fn is_route_salesperson(name: &str) -> bool {
    let key = normalize_salesperson(name);
    !key.is_empty() && !NON_ROUTE_SALESPEOPLE.contains(&key.as_str())
}

/// Units sold on one day (raw import row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySale {
    pub store_number: StoreNumber,
    pub product_id: ProductId,
    pub sale_date: NaiveDate,
    pub units: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

/// Sum daily sales into Monday-aligned weekly facts.
pub fn weekly_rollup(daily: &[DailySale]) -> Vec<WeeklySalesFact> {
    let mut weeks: BTreeMap<(StoreNumber, ProductId, WeekStart), (f64, Option<String>)> = BTreeMap::new();

    for sale in daily {
        let key = (
            sale.store_number.clone(),
            sale.product_id.clone(),
            WeekStart::containing(sale.sale_date),
        );
        let (units, name) = weeks.entry(key).or_insert((0.0, None));
        *units += sale.units;
        if sale.product_name.is_some() {
            name.clone_from(&sale.product_name);
        }
    }

    weeks
        .into_iter()
        .map(|((store_number, product_id, week), (quantity, product_name))| WeeklySalesFact {
            store_number,
            product_id,
            week_start_date: week.date(),
            quantity,
            product_name,
        })
        .collect()
}

/// Scope and history of one tenant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub scope: Vec<ScopeEntry>,
    #[serde(default)]
    pub history: Vec<WeeklySalesFact>,
    /// Raw daily rows, rolled into `history` on load.
    #[serde(default)]
    pub daily: Vec<DailySale>,
}

impl Dataset {
    /// Fold `daily` into `history`.
    pub fn normalized(mut self) -> Self {
        let daily = std::mem::take(&mut self.daily);
        self.history.extend(weekly_rollup(&daily));
        self
    }
}

/// Tenant-partitioned in-memory provider.
#[derive(Debug)]
pub struct InMemoryStore {
    inner: RwLock<HashMap<TenantId, Dataset>>,
    window_days: i64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            window_days: HISTORY_WINDOW_DAYS,
        }
    }

    pub fn with_window_days(mut self, window_days: i64) -> Self {
        self.window_days = window_days;
        self
    }

    /// Replace the tenant's dataset. Returns (scope rows, weekly facts) stored.
    pub fn load(&self, tenant_id: TenantId, dataset: Dataset) -> Result<(usize, usize), ProviderError> {
        let dataset = dataset.normalized();
        let counts = (dataset.scope.len(), dataset.history.len());
        self.inner
            .write()
            .map_err(|_| ProviderError::Unavailable("in-memory store lock poisoned".to_string()))?
            .insert(tenant_id, dataset);
        Ok(counts)
    }

    fn read<T>(&self, tenant_id: TenantId, f: impl FnOnce(&Dataset) -> T) -> Result<T, ProviderError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| ProviderError::Unavailable("in-memory store lock poisoned".to_string()))?;
        let empty = Dataset::default();
        Ok(f(guard.get(&tenant_id).unwrap_or(&empty)))
    }
}

impl ScopeProvider for InMemoryStore {
    fn scope(&self, tenant_id: TenantId, salesperson: Option<&str>) -> Result<Vec<ScopeEntry>, ProviderError> {
        let wanted = salesperson.map(normalize_salesperson).filter(|s| !s.is_empty());
        self.read(tenant_id, |dataset| {
            dataset
                .scope
                .iter()
                .filter(|e| match &wanted {
                    Some(w) => normalize_salesperson(&e.salesperson) == *w,
                    None => true,
                })
                .cloned()
                .collect()
        })
    }

    fn salespeople(&self, tenant_id: TenantId) -> Result<Vec<String>, ProviderError> {
        self.read(tenant_id, |dataset| {
            dataset
                .scope
                .iter()
                .map(|e| normalize_salesperson(&e.salesperson))
                .filter(|name| is_route_salesperson(name))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
    }
}

impl HistoryProvider for InMemoryStore {
    fn weekly_history(
        &self,
        tenant_id: TenantId,
        scope: &[ScopeEntry],
        as_of: NaiveDate,
    ) -> Result<Vec<WeeklySalesFact>, ProviderError> {
        let from = as_of - Duration::days(self.window_days);
        let pairs: HashSet<(&StoreNumber, &ProductId)> =
            scope.iter().map(|e| (&e.store_number, &e.product_id)).collect();

        self.read(tenant_id, |dataset| {
            dataset
                .history
                .iter()
                .filter(|f| f.week_start_date >= from && f.week_start_date < as_of)
                .filter(|f| pairs.contains(&(&f.store_number, &f.product_id)))
                .cloned()
                .collect()
        })
    }
}
