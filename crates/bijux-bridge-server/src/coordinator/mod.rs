// SPDX-License-Identifier: Apache-2.0

use crate::store::StoreError;
use bijux_bridge_model::{CustomerId, ValidationErrors};
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::time::Duration;

mod cancel;
mod lookup;
mod write;

pub use cancel::{cancel_pair, CancelOnDrop, CancelSignal};
pub use lookup::LookupCoordinator;
pub use write::WriteCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreSide {
    New,
    Legacy,
}

impl StoreSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Legacy => "legacy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewStoreOutcome {
    Committed(CustomerId),
    Failed(StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LegacyStoreOutcome {
    Written,
    Failed(StoreError),
    /// Never attempted because the new store did not commit.
    Skipped,
    /// Aborted after the new store committed because the caller went away.
    Cancelled,
}

/// Per-store result of a dual write that did not fully succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialFailure {
    pub new_store: NewStoreOutcome,
    pub legacy_store: LegacyStoreOutcome,
}

impl PartialFailure {
    /// The id minted by the new store, present only when it committed.
    #[must_use]
    pub fn canonical_id(&self) -> Option<&CustomerId> {
        match &self.new_store {
            NewStoreOutcome::Committed(id) => Some(id),
            NewStoreOutcome::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    Validation(ValidationErrors),
    NotFound(CustomerId),
    UpstreamUnavailable { side: StoreSide, error: StoreError },
    PartialFailure(PartialFailure),
    Cancelled,
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(errors) => write!(f, "validation failed: {errors}"),
            Self::NotFound(id) => write!(f, "customer {id} not found"),
            Self::UpstreamUnavailable { side, error } => {
                write!(f, "{} store unavailable: {error}", side.as_str())
            }
            Self::PartialFailure(p) => match (&p.new_store, &p.legacy_store) {
                (NewStoreOutcome::Committed(id), legacy) => {
                    write!(f, "customer {id} committed to new store; legacy write {legacy:?}")
                }
                (NewStoreOutcome::Failed(e), _) => write!(f, "new store write failed: {e}"),
            },
            Self::Cancelled => f.write_str("request cancelled"),
        }
    }
}

impl std::error::Error for GatewayError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterTimeouts {
    pub new_store: Duration,
    pub legacy_store: Duration,
}

impl AdapterTimeouts {
    #[must_use]
    pub const fn for_side(&self, side: StoreSide) -> Duration {
        match side {
            StoreSide::New => self.new_store,
            StoreSide::Legacy => self.legacy_store,
        }
    }
}

impl Default for AdapterTimeouts {
    fn default() -> Self {
        Self {
            new_store: Duration::from_secs(2),
            legacy_store: Duration::from_secs(2),
        }
    }
}

/// Runs one adapter call under the side's budget. Elapsed becomes a
/// `Timeout` store error.
pub(crate) async fn bounded<T, F>(
    timeouts: &AdapterTimeouts,
    side: StoreSide,
    op: &'static str,
    call: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    let budget = timeouts.for_side(side);
    match tokio::time::timeout(budget, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::timeout(format!(
            "{} store {op} exceeded {}ms",
            side.as_str(),
            budget.as_millis()
        ))),
    }
}
