// SPDX-License-Identifier: Apache-2.0

use crate::coordinator::{
    bounded, AdapterTimeouts, CancelSignal, GatewayError, LookupCoordinator, StoreSide,
    WriteCoordinator,
};
use crate::effects::{ClockAdapter, SystemClock};
use crate::store::{LegacyCustomerStore, NewCustomerStore};
use crate::telemetry::GatewayMetrics;
use bijux_bridge_model::{Customer, CustomerId, CustomerInput, MigrationProgress, Sourced};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Boundary the HTTP layer talks to. Owns both coordinators and the
/// progress query, and records outcome metrics for each call.
pub struct MigrationGateway {
    lookup: LookupCoordinator,
    write: WriteCoordinator,
    new_store: Arc<dyn NewCustomerStore>,
    legacy_store: Arc<dyn LegacyCustomerStore>,
    timeouts: AdapterTimeouts,
    metrics: Arc<GatewayMetrics>,
}

impl MigrationGateway {
    #[must_use]
    pub fn new(
        new_store: Arc<dyn NewCustomerStore>,
        legacy_store: Arc<dyn LegacyCustomerStore>,
        timeouts: AdapterTimeouts,
    ) -> Self {
        Self::with_clock(new_store, legacy_store, Arc::new(SystemClock), timeouts)
    }

    #[must_use]
    pub fn with_clock(
        new_store: Arc<dyn NewCustomerStore>,
        legacy_store: Arc<dyn LegacyCustomerStore>,
        clock: Arc<dyn ClockAdapter>,
        timeouts: AdapterTimeouts,
    ) -> Self {
        Self {
            lookup: LookupCoordinator::new(
                Arc::clone(&new_store),
                Arc::clone(&legacy_store),
                timeouts,
            ),
            write: WriteCoordinator::new(
                Arc::clone(&new_store),
                Arc::clone(&legacy_store),
                clock,
                timeouts,
            ),
            new_store,
            legacy_store,
            timeouts,
            metrics: Arc::new(GatewayMetrics::default()),
        }
    }

    #[must_use]
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub async fn find(&self, id: &CustomerId) -> Result<Sourced<Customer>, GatewayError> {
        let result = self.lookup.find(id).await;
        self.metrics
            .observe_lookup(result.as_ref().map(|found| found.source));
        result
    }

    pub async fn create(&self, input: &CustomerInput) -> Result<Sourced<Customer>, GatewayError> {
        self.create_with_cancel(input, &CancelSignal::never()).await
    }

    pub async fn create_with_cancel(
        &self,
        input: &CustomerInput,
        cancel: &CancelSignal,
    ) -> Result<Sourced<Customer>, GatewayError> {
        let result = self.write.create_with_cancel(input, cancel).await;
        self.metrics.observe_create(result.as_ref().map(|_| ()));
        result
    }

    #[instrument(name = "gateway_stats", skip(self))]
    pub async fn stats(&self) -> Result<MigrationProgress, GatewayError> {
        let modern = self.count(StoreSide::New).await?;
        let legacy = self.count(StoreSide::Legacy).await?;
        Ok(MigrationProgress::from_counts(legacy, modern))
    }

    async fn count(&self, side: StoreSide) -> Result<u64, GatewayError> {
        let counted = match side {
            StoreSide::New => bounded(&self.timeouts, side, "count", self.new_store.count()).await,
            StoreSide::Legacy => {
                bounded(&self.timeouts, side, "count", self.legacy_store.count()).await
            }
        };
        counted.map_err(|error| {
            self.metrics.stats_failures.fetch_add(1, Ordering::Relaxed);
            warn!(side = side.as_str(), error = %error, "store count failed");
            GatewayError::UpstreamUnavailable { side, error }
        })
    }
}
