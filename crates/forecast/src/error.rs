use thiserror::Error;

use truckplan_core::DomainError;

/// Failure of a forecast computation.
///
/// An empty scope is *not* an error; see [`crate::ForecastOutcome::EmptyScope`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ForecastError {
    #[error("invalid horizon: {requested} week(s), expected 1..=4")]
    InvalidHorizon { requested: u32 },

    #[error("malformed history for store {store_number}, product {product_id}: {reason}")]
    MalformedHistory {
        store_number: String,
        product_id: String,
        reason: String,
    },

    #[error("tenant scope violation: {0}")]
    TenantScope(String),
}

impl ForecastError {
    pub fn malformed(
        store_number: impl Into<String>,
        product_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedHistory {
            store_number: store_number.into(),
            product_id: product_id.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a scope/history provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
