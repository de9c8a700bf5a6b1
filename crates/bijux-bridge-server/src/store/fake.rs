// SPDX-License-Identifier: Apache-2.0

//! Test doubles for both stores.
//!
//! Every call is counted and appended to a [`CallLog`] that two fakes may
//! share, so tests can assert on cross-store ordering. Failures and latency
//! are injected through the public fields.

use super::{LegacyCustomerStore, NewCustomerStore, StoreError};
use async_trait::async_trait;
use bijux_bridge_model::{Customer, CustomerDraft, CustomerId, LegacyCustomer};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<std::sync::Mutex<Vec<&'static str>>>);

impl CallLog {
    pub fn record(&self, call: &'static str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

pub struct FakeNewStore {
    pub records: Mutex<BTreeMap<CustomerId, Customer>>,
    pub get_calls: AtomicU64,
    pub put_calls: AtomicU64,
    pub count_calls: AtomicU64,
    pub fail_get: Mutex<Option<StoreError>>,
    pub fail_put: Mutex<Option<StoreError>>,
    pub fail_count: Mutex<Option<StoreError>>,
    pub delay: Duration,
    pub log: CallLog,
    seq: AtomicU64,
}

impl Default for FakeNewStore {
    fn default() -> Self {
        Self::with_log(CallLog::default())
    }
}

impl FakeNewStore {
    #[must_use]
    pub fn with_log(log: CallLog) -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            get_calls: AtomicU64::new(0),
            put_calls: AtomicU64::new(0),
            count_calls: AtomicU64::new(0),
            fail_get: Mutex::new(None),
            fail_put: Mutex::new(None),
            fail_count: Mutex::new(None),
            delay: Duration::ZERO,
            log,
            seq: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn seed(&self, customer: Customer) {
        self.records
            .lock()
            .await
            .insert(customer.id.clone(), customer);
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl NewCustomerStore for FakeNewStore {
    fn backend_tag(&self) -> &'static str {
        "fake"
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<Customer>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        self.log.record("new.get");
        self.pause().await;
        if let Some(err) = self.fail_get.lock().await.clone() {
            return Err(err);
        }
        Ok(self.records.lock().await.get(id).cloned())
    }

    async fn put(&self, draft: CustomerDraft) -> Result<Customer, StoreError> {
        self.put_calls.fetch_add(1, Ordering::Relaxed);
        self.log.record("new.put");
        self.pause().await;
        if let Some(err) = self.fail_put.lock().await.clone() {
            return Err(err);
        }
        let id = CustomerId::from_sequence(self.seq.fetch_add(1, Ordering::Relaxed) + 1);
        let customer = Customer::from_draft(id.clone(), draft);
        self.records.lock().await.insert(id, customer.clone());
        Ok(customer)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.count_calls.fetch_add(1, Ordering::Relaxed);
        self.log.record("new.count");
        if let Some(err) = self.fail_count.lock().await.clone() {
            return Err(err);
        }
        Ok(self.records.lock().await.len() as u64)
    }
}

pub struct FakeLegacyStore {
    pub records: Mutex<BTreeMap<CustomerId, LegacyCustomer>>,
    pub get_calls: AtomicU64,
    pub put_calls: AtomicU64,
    pub count_calls: AtomicU64,
    pub fail_get: Mutex<Option<StoreError>>,
    pub fail_put: Mutex<Option<StoreError>>,
    pub fail_count: Mutex<Option<StoreError>>,
    pub delay: Duration,
    pub log: CallLog,
}

impl Default for FakeLegacyStore {
    fn default() -> Self {
        Self::with_log(CallLog::default())
    }
}

impl FakeLegacyStore {
    #[must_use]
    pub fn with_log(log: CallLog) -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            get_calls: AtomicU64::new(0),
            put_calls: AtomicU64::new(0),
            count_calls: AtomicU64::new(0),
            fail_get: Mutex::new(None),
            fail_put: Mutex::new(None),
            fail_count: Mutex::new(None),
            delay: Duration::ZERO,
            log,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub async fn seed(&self, record: LegacyCustomer) {
        self.records
            .lock()
            .await
            .insert(record.customer_id.clone(), record);
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl LegacyCustomerStore for FakeLegacyStore {
    fn backend_tag(&self) -> &'static str {
        "fake"
    }

    async fn get(&self, id: &CustomerId) -> Result<Option<LegacyCustomer>, StoreError> {
        self.get_calls.fetch_add(1, Ordering::Relaxed);
        self.log.record("legacy.get");
        self.pause().await;
        if let Some(err) = self.fail_get.lock().await.clone() {
            return Err(err);
        }
        Ok(self.records.lock().await.get(id).cloned())
    }

    async fn put(&self, record: LegacyCustomer) -> Result<(), StoreError> {
        self.put_calls.fetch_add(1, Ordering::Relaxed);
        self.log.record("legacy.put");
        self.pause().await;
        if let Some(err) = self.fail_put.lock().await.clone() {
            return Err(err);
        }
        self.records
            .lock()
            .await
            .insert(record.customer_id.clone(), record);
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.count_calls.fetch_add(1, Ordering::Relaxed);
        self.log.record("legacy.count");
        if let Some(err) = self.fail_count.lock().await.clone() {
            return Err(err);
        }
        Ok(self.records.lock().await.len() as u64)
    }
}
