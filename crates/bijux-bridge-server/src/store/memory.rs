// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use bijux_bridge_model::{Customer, CustomerDraft, CustomerId, LegacyCustomer};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

use super::{LegacyCustomerStore, NewCustomerStore, StoreError};

#[derive(Default)]
pub struct MemoryNewStore {
    records: RwLock<BTreeMap<CustomerId, Customer>>,
    seq: AtomicU64,
}

impl MemoryNewStore {
    /// Inserts an already-identified customer, bypassing id minting.
    pub async fn seed(&self, customer: Customer) {
        self.records
            .write()
            .await
            .insert(customer.id.clone(), customer);
    }
}

#[async_trait]
impl NewCustomerStore for MemoryNewStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn put(&self, draft: CustomerDraft) -> Result<Customer, StoreError> {
        let mut records = self.records.write().await;
        // Seeded ids may occupy sequence slots.
        let id = loop {
            let candidate = CustomerId::from_sequence(self.seq.fetch_add(1, Ordering::Relaxed) + 1);
            if !records.contains_key(&candidate) {
                break candidate;
            }
        };
        let customer = Customer::from_draft(id.clone(), draft);
        records.insert(id, customer.clone());
        Ok(customer)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records.read().await.len() as u64)
    }
}

#[derive(Default)]
pub struct MemoryLegacyStore {
    records: RwLock<BTreeMap<CustomerId, LegacyCustomer>>,
}

#[async_trait]
impl LegacyCustomerStore for MemoryLegacyStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<LegacyCustomer>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn put(&self, record: LegacyCustomer) -> Result<(), StoreError> {
        self.records
            .write()
            .await
            .insert(record.customer_id.clone(), record);
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.records.read().await.len() as u64)
    }
}
