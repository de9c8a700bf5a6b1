// SPDX-License-Identifier: Apache-2.0

use super::{bounded, AdapterTimeouts, GatewayError, StoreSide};
use crate::store::{LegacyCustomerStore, NewCustomerStore};
use bijux_bridge_model::{to_unified, Customer, CustomerId, Source, Sourced};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Fallback read: new store first, legacy store only on a genuine miss.
pub struct LookupCoordinator {
    new_store: Arc<dyn NewCustomerStore>,
    legacy_store: Arc<dyn LegacyCustomerStore>,
    timeouts: AdapterTimeouts,
}

impl LookupCoordinator {
    #[must_use]
    pub fn new(
        new_store: Arc<dyn NewCustomerStore>,
        legacy_store: Arc<dyn LegacyCustomerStore>,
        timeouts: AdapterTimeouts,
    ) -> Self {
        Self {
            new_store,
            legacy_store,
            timeouts,
        }
    }

    #[instrument(name = "lookup_find", skip(self), fields(customer_id = %id))]
    pub async fn find(&self, id: &CustomerId) -> Result<Sourced<Customer>, GatewayError> {
        match bounded(&self.timeouts, StoreSide::New, "get", self.new_store.get(id)).await {
            Ok(Some(customer)) => return Ok(Sourced::new(customer, Source::NewDb)),
            Ok(None) => debug!("new store miss, falling back to legacy store"),
            Err(error) => {
                warn!(
                    backend = self.new_store.backend_tag(),
                    error = %error,
                    "new store lookup failed"
                );
                return Err(GatewayError::UpstreamUnavailable {
                    side: StoreSide::New,
                    error,
                });
            }
        }

        match bounded(
            &self.timeouts,
            StoreSide::Legacy,
            "get",
            self.legacy_store.get(id),
        )
        .await
        {
            Ok(Some(record)) => {
                debug!("served from legacy store");
                Ok(Sourced::new(to_unified(&record), Source::LegacyDb))
            }
            Ok(None) => Err(GatewayError::NotFound(id.clone())),
            Err(error) => {
                warn!(
                    backend = self.legacy_store.backend_tag(),
                    error = %error,
                    "legacy store lookup failed"
                );
                Err(GatewayError::UpstreamUnavailable {
                    side: StoreSide::Legacy,
                    error,
                })
            }
        }
    }
}
