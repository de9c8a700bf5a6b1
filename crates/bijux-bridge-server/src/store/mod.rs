// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use bijux_bridge_model::{Customer, CustomerDraft, CustomerId, LegacyCustomer};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::config::{RemoteStoreConfig, StoreSpec};

pub mod fake;
pub mod memory;
pub mod remote;
pub mod sqlite;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreErrorKind {
    Timeout,
    Unavailable,
    Rejected,
    Corrupt,
}

impl StoreErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Unavailable => "unavailable",
            Self::Rejected => "rejected",
            Self::Corrupt => "corrupt",
        }
    }
}

/// Adapter failure. A miss is never an error; it is `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Timeout, message)
    }

    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }

    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Rejected, message)
    }

    #[must_use]
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Corrupt, message)
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.message)
    }
}

impl std::error::Error for StoreError {}

/// Authoritative store for the unified schema. `put` mints the canonical id.
#[async_trait]
pub trait NewCustomerStore: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<Customer>, StoreError>;
    async fn put(&self, draft: CustomerDraft) -> Result<Customer, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
}

/// Store being phased out. `put` inserts or updates under the given id and
/// never deletes.
#[async_trait]
pub trait LegacyCustomerStore: Send + Sync + 'static {
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<LegacyCustomer>, StoreError>;
    async fn put(&self, record: LegacyCustomer) -> Result<(), StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
}

pub fn open_new_store(
    spec: &StoreSpec,
    remote: &RemoteStoreConfig,
) -> Result<Arc<dyn NewCustomerStore>, StoreError> {
    Ok(match spec {
        StoreSpec::Memory => Arc::new(memory::MemoryNewStore::default()),
        StoreSpec::Sqlite(path) => Arc::new(sqlite::SqliteNewStore::open(path)?),
        StoreSpec::Remote(base_url) => Arc::new(remote::HttpNewStore::new(
            remote::RemoteStoreClient::new(base_url, remote)?,
        )),
    })
}

pub fn open_legacy_store(
    spec: &StoreSpec,
    remote: &RemoteStoreConfig,
) -> Result<Arc<dyn LegacyCustomerStore>, StoreError> {
    Ok(match spec {
        StoreSpec::Memory => Arc::new(memory::MemoryLegacyStore::default()),
        StoreSpec::Sqlite(path) => Arc::new(sqlite::SqliteLegacyStore::open(path)?),
        StoreSpec::Remote(base_url) => Arc::new(remote::HttpLegacyStore::new(
            remote::RemoteStoreClient::new(base_url, remote)?,
        )),
    })
}
