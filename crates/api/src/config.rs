//! Process configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use truckplan_core::TenantId;
use truckplan_forecast::{HISTORY_WINDOW_DAYS, Horizon, TenantScope};

pub const BIND_ADDR_ENV: &str = "TRUCKPLAN_BIND_ADDR";
pub const DEFAULT_HORIZON_ENV: &str = "TRUCKPLAN_DEFAULT_HORIZON";
pub const HISTORY_DAYS_ENV: &str = "TRUCKPLAN_HISTORY_DAYS";
pub const DATA_PATH_ENV: &str = "TRUCKPLAN_DATA_PATH";
pub const DATA_TENANT_ENV: &str = "TRUCKPLAN_DATA_TENANT";
pub const TENANT_SCOPE_ENV: &str = "TRUCKPLAN_TENANT_SCOPE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON dataset preloaded into the in-memory store at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSource {
    pub path: PathBuf,
    pub tenant_id: TenantId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub default_horizon: Horizon,
    pub history_days: i64,
    pub dataset: Option<DatasetSource>,
    /// Tenants this process serves: `any` (default) or a single tenant id.
    pub tenant_scope: TenantScope,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test map, ...).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = get(BIND_ADDR_ENV)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                var: BIND_ADDR_ENV,
                reason: e.to_string(),
            })?;

        let default_horizon = match get(DEFAULT_HORIZON_ENV) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| e.to_string())
                .and_then(|weeks| Horizon::new(weeks).map_err(|e| e.to_string()))
                .map_err(|reason| ConfigError::Invalid {
                    var: DEFAULT_HORIZON_ENV,
                    reason,
                })?,
            None => Horizon::new(Horizon::MAX).map_err(|e| ConfigError::Invalid {
                var: DEFAULT_HORIZON_ENV,
                reason: e.to_string(),
            })?,
        };

        let history_days = match get(HISTORY_DAYS_ENV) {
            Some(raw) => {
                let days = raw.parse::<i64>().map_err(|e| ConfigError::Invalid {
                    var: HISTORY_DAYS_ENV,
                    reason: e.to_string(),
                })?;
                if days <= 0 {
                    return Err(ConfigError::Invalid {
                        var: HISTORY_DAYS_ENV,
                        reason: "must be a positive number of days".to_string(),
                    });
                }
                days
            }
            None => HISTORY_WINDOW_DAYS,
        };

        let dataset = match get(DATA_PATH_ENV) {
            Some(path) => {
                let tenant_id = get(DATA_TENANT_ENV)
                    .ok_or(ConfigError::Missing(DATA_TENANT_ENV))?
                    .parse::<TenantId>()
                    .map_err(|e| ConfigError::Invalid {
                        var: DATA_TENANT_ENV,
                        reason: e.to_string(),
                    })?;
                Some(DatasetSource {
                    path: PathBuf::from(path),
                    tenant_id,
                })
            }
            None => None,
        };

        let tenant_scope = match get(TENANT_SCOPE_ENV) {
            None => TenantScope::Any,
            Some(raw) if raw.eq_ignore_ascii_case("any") => TenantScope::Any,
            Some(raw) => TenantScope::Tenant(raw.parse::<TenantId>().map_err(|e| ConfigError::Invalid {
                var: TENANT_SCOPE_ENV,
                reason: e.to_string(),
            })?),
        };

        if let Some(source) = &dataset {
            if !tenant_scope.allows(source.tenant_id) {
                return Err(ConfigError::Invalid {
                    var: DATA_TENANT_ENV,
                    reason: format!("tenant {} is outside {TENANT_SCOPE_ENV}", source.tenant_id),
                });
            }
        }

        Ok(Self {
            bind_addr,
            default_horizon,
            history_days,
            dataset,
            tenant_scope,
        })
    }
}
