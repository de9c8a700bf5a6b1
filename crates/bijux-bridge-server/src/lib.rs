#![forbid(unsafe_code)]
//! Migration gateway server.
//!
//! Serves customers from a new store with fallback to a legacy store, and
//! writes new customers to both under the id the new store mints.

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use bijux_bridge_api::{API_ROUTE_CUSTOMER, API_ROUTE_CUSTOMER_BY_ID, API_ROUTE_STATS};
use std::sync::atomic::{AtomicBool, AtomicU64};
use std::sync::Arc;

pub mod config;
pub mod coordinator;
pub mod effects;
mod gateway;
pub mod http;
mod middleware;
pub mod store;
pub mod telemetry;

pub use config::{
    validate_startup_config_contract, ApiConfig, GatewayConfig, RemoteStoreConfig, RetryPolicy,
    StoreSpec,
};
pub use coordinator::{
    cancel_pair, AdapterTimeouts, CancelOnDrop, CancelSignal, GatewayError, LegacyStoreOutcome,
    LookupCoordinator, NewStoreOutcome, PartialFailure, StoreSide, WriteCoordinator,
};
pub use effects::{ClockAdapter, FixedClock, SystemClock};
pub use gateway::MigrationGateway;
pub use store::fake::{CallLog, FakeLegacyStore, FakeNewStore};
pub use store::memory::{MemoryLegacyStore, MemoryNewStore};
pub use store::remote::{HttpLegacyStore, HttpNewStore, RemoteStoreClient};
pub use store::sqlite::{SqliteLegacyStore, SqliteNewStore};
pub use store::{
    open_legacy_store, open_new_store, LegacyCustomerStore, NewCustomerStore, StoreError,
    StoreErrorKind,
};
pub use telemetry::{init_tracing, GatewayMetrics};

pub const CRATE_NAME: &str = "bijux-bridge-server";

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<MigrationGateway>,
    pub api: ApiConfig,
    pub metrics: Arc<GatewayMetrics>,
    pub request_id_seed: Arc<AtomicU64>,
    pub accepting_requests: Arc<AtomicBool>,
}

impl AppState {
    #[must_use]
    pub fn new(gateway: MigrationGateway) -> Self {
        Self::with_config(gateway, ApiConfig::default())
    }

    #[must_use]
    pub fn with_config(gateway: MigrationGateway, api: ApiConfig) -> Self {
        let metrics = gateway.metrics();
        Self {
            gateway: Arc::new(gateway),
            api,
            metrics,
            request_id_seed: Arc::new(AtomicU64::new(1)),
            accepting_requests: Arc::new(AtomicBool::new(true)),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Self::new(MigrationGateway::new(
            Arc::new(MemoryNewStore::default()),
            Arc::new(MemoryLegacyStore::default()),
            AdapterTimeouts::default(),
        ))
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/metrics", get(http::handlers::metrics_handler))
        .route("/v1/openapi.json", get(http::handlers::openapi_handler))
        .route(
            API_ROUTE_CUSTOMER,
            axum::routing::post(http::handlers::create_customer_handler),
        )
        .route(API_ROUTE_STATS, get(http::handlers::stats_handler))
        .route(
            API_ROUTE_CUSTOMER_BY_ID,
            get(http::handlers::get_customer_handler),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::cors::cors_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
