// SPDX-License-Identifier: Apache-2.0

use super::{
    bounded, AdapterTimeouts, CancelSignal, GatewayError, LegacyStoreOutcome, NewStoreOutcome,
    PartialFailure, StoreSide,
};
use crate::effects::ClockAdapter;
use crate::store::{LegacyCustomerStore, NewCustomerStore};
use bijux_bridge_model::{to_legacy, Customer, CustomerInput, Source, Sourced};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Dual write: the new store mints the id, then the legacy store receives
/// the flattened copy under that id. There is no rollback.
pub struct WriteCoordinator {
    new_store: Arc<dyn NewCustomerStore>,
    legacy_store: Arc<dyn LegacyCustomerStore>,
    clock: Arc<dyn ClockAdapter>,
    timeouts: AdapterTimeouts,
}

impl WriteCoordinator {
    #[must_use]
    pub fn new(
        new_store: Arc<dyn NewCustomerStore>,
        legacy_store: Arc<dyn LegacyCustomerStore>,
        clock: Arc<dyn ClockAdapter>,
        timeouts: AdapterTimeouts,
    ) -> Self {
        Self {
            new_store,
            legacy_store,
            clock,
            timeouts,
        }
    }

    pub async fn create(&self, input: &CustomerInput) -> Result<Sourced<Customer>, GatewayError> {
        self.create_with_cancel(input, &CancelSignal::never()).await
    }

    #[instrument(name = "write_create", skip_all)]
    pub async fn create_with_cancel(
        &self,
        input: &CustomerInput,
        cancel: &CancelSignal,
    ) -> Result<Sourced<Customer>, GatewayError> {
        let draft = input.validate().map_err(GatewayError::Validation)?;
        if cancel.is_cancelled() {
            info!("create cancelled before any store write");
            return Err(GatewayError::Cancelled);
        }

        // Not raced against `cancel`: once started the commit must be observed.
        let created = match bounded(
            &self.timeouts,
            StoreSide::New,
            "put",
            self.new_store.put(draft),
        )
        .await
        {
            Ok(created) => created,
            Err(error) => {
                warn!(
                    backend = self.new_store.backend_tag(),
                    error = %error,
                    "new store write failed; legacy write skipped"
                );
                return Err(GatewayError::PartialFailure(PartialFailure {
                    new_store: NewStoreOutcome::Failed(error),
                    legacy_store: LegacyStoreOutcome::Skipped,
                }));
            }
        };
        let id = created.id.clone();
        info!(customer_id = %id, "new store committed");

        let today = self.clock.today();
        let record = to_legacy(&created, Some(&today));
        let legacy_write = bounded(
            &self.timeouts,
            StoreSide::Legacy,
            "put",
            self.legacy_store.put(record),
        );
        let legacy_store = tokio::select! {
            biased;
            result = legacy_write => match result {
                Ok(()) => LegacyStoreOutcome::Written,
                Err(error) => LegacyStoreOutcome::Failed(error),
            },
            () = cancel.cancelled() => LegacyStoreOutcome::Cancelled,
        };

        match legacy_store {
            LegacyStoreOutcome::Written => {
                info!(customer_id = %id, "dual write complete");
                Ok(Sourced::new(created, Source::NewDb))
            }
            outcome => {
                warn!(
                    customer_id = %id,
                    backend = self.legacy_store.backend_tag(),
                    legacy_outcome = ?outcome,
                    "legacy write did not complete; new store record kept"
                );
                Err(GatewayError::PartialFailure(PartialFailure {
                    new_store: NewStoreOutcome::Committed(id),
                    legacy_store: outcome,
                }))
            }
        }
    }
}
