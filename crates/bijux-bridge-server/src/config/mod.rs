// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    /// `*` allows any origin. Empty disables CORS headers entirely.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024,
            request_timeout: Duration::from_secs(10),
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "backend", content = "location", rename_all = "snake_case")]
pub enum StoreSpec {
    Memory,
    Sqlite(PathBuf),
    Remote(String),
}

impl StoreSpec {
    /// Parses `memory:`, `sqlite:/path/to.db` or `http:https://host/base`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let (scheme, rest) = raw
            .split_once(':')
            .ok_or_else(|| format!("store spec `{raw}` must be `<backend>:<location>`"))?;
        match scheme {
            "memory" if rest.is_empty() => Ok(Self::Memory),
            "memory" => Err(format!("memory store takes no location, got `{rest}`")),
            "sqlite" if rest.is_empty() => Err("sqlite store requires a file path".to_string()),
            "sqlite" => Ok(Self::Sqlite(PathBuf::from(rest))),
            "http" => {
                if rest.starts_with("http://") || rest.starts_with("https://") {
                    Ok(Self::Remote(rest.trim_end_matches('/').to_string()))
                } else {
                    Err(format!("http store requires an http(s) base url, got `{rest}`"))
                }
            }
            other => Err(format!("unknown store backend `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteStoreConfig {
    pub request_timeout: Duration,
    #[serde(skip_serializing)]
    pub auth_bearer: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            auth_bearer: None,
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayConfig {
    pub new_store: StoreSpec,
    pub legacy_store: StoreSpec,
    pub new_store_timeout: Duration,
    pub legacy_store_timeout: Duration,
    pub remote: RemoteStoreConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            new_store: StoreSpec::Memory,
            legacy_store: StoreSpec::Memory,
            new_store_timeout: Duration::from_millis(2000),
            legacy_store_timeout: Duration::from_millis(2000),
            remote: RemoteStoreConfig::default(),
        }
    }
}

pub fn validate_startup_config_contract(
    api: &ApiConfig,
    gateway: &GatewayConfig,
) -> Result<(), String> {
    if api.max_body_bytes == 0 {
        return Err("api body limit must be > 0".to_string());
    }
    if api.request_timeout.is_zero()
        || gateway.new_store_timeout.is_zero()
        || gateway.legacy_store_timeout.is_zero()
    {
        return Err("timeouts must be > 0".to_string());
    }
    let adapter_budget = gateway
        .new_store_timeout
        .saturating_add(gateway.legacy_store_timeout);
    if api.request_timeout <= adapter_budget {
        return Err(format!(
            "request timeout ({} ms) must exceed new + legacy store timeouts ({} ms)",
            api.request_timeout.as_millis(),
            adapter_budget.as_millis()
        ));
    }
    if gateway.remote.retry.max_attempts == 0 {
        return Err("remote retry max_attempts must be > 0".to_string());
    }
    let uses_remote = matches!(gateway.new_store, StoreSpec::Remote(_))
        || matches!(gateway.legacy_store, StoreSpec::Remote(_));
    if uses_remote && gateway.remote.request_timeout.is_zero() {
        return Err("remote store request timeout must be > 0".to_string());
    }
    if let (StoreSpec::Sqlite(a), StoreSpec::Sqlite(b)) = (&gateway.new_store, &gateway.legacy_store)
    {
        if a == b {
            return Err("new and legacy sqlite stores must use different files".to_string());
        }
    }
    if api.cors_allowed_origins.iter().any(|o| o.trim().is_empty()) {
        return Err("cors allowed origins must not contain blank entries".to_string());
    }
    Ok(())
}
