use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use bijux_bridge_model::{AccountType, CustomerId, CustomerInput, Source};
use bijux_bridge_server::{
    cancel_pair, AdapterTimeouts, CallLog, FakeLegacyStore, FakeNewStore, FixedClock,
    GatewayError, LegacyStoreOutcome, MigrationGateway, NewCustomerStore, NewStoreOutcome,
    StoreError, StoreErrorKind, WriteCoordinator,
};
use chrono::NaiveDate;

struct Harness {
    log: CallLog,
    new_store: Arc<FakeNewStore>,
    legacy_store: Arc<FakeLegacyStore>,
}

impl Harness {
    fn new() -> Self {
        Self::with_stores(|n| n, |l| l)
    }

    fn with_stores(
        new_fn: impl FnOnce(FakeNewStore) -> FakeNewStore,
        legacy_fn: impl FnOnce(FakeLegacyStore) -> FakeLegacyStore,
    ) -> Self {
        let log = CallLog::default();
        Self {
            new_store: Arc::new(new_fn(FakeNewStore::with_log(log.clone()))),
            legacy_store: Arc::new(legacy_fn(FakeLegacyStore::with_log(log.clone()))),
            log,
        }
    }

    fn writer(&self, timeouts: AdapterTimeouts) -> WriteCoordinator {
        WriteCoordinator::new(
            self.new_store.clone(),
            self.legacy_store.clone(),
            Arc::new(FixedClock(
                NaiveDate::from_ymd_opt(2026, 5, 4).expect("date"),
            )),
            timeouts,
        )
    }
}

fn sam() -> CustomerInput {
    CustomerInput {
        name: Some("Sam Lee".to_string()),
        email: Some("sam@x.com".to_string()),
        street: Some("1 Main St".to_string()),
        city: Some("Austin".to_string()),
        state: Some("TX".to_string()),
        zip_code: Some("78701".to_string()),
        ..CustomerInput::default()
    }
}

#[tokio::test]
async fn healthy_create_writes_new_then_legacy_under_minted_id() {
    let h = Harness::new();
    let created = h
        .writer(AdapterTimeouts::default())
        .create(&sam())
        .await
        .expect("create");

    assert_eq!(created.source, Source::NewDb);
    assert_eq!(created.value.id.as_str(), "NEW000001");
    assert_eq!(created.value.account_type, Some(AccountType::Savings));
    assert_eq!(h.log.calls(), vec!["new.put", "legacy.put"]);
    assert_eq!(h.new_store.put_calls.load(Ordering::Relaxed), 1);
    assert_eq!(h.legacy_store.put_calls.load(Ordering::Relaxed), 1);

    let legacy = h.legacy_store.records.lock().await;
    let copy = legacy.get(&created.value.id).expect("legacy copy");
    assert_eq!(copy.full_name, "Sam Lee");
    assert_eq!(copy.address.as_deref(), Some("1 Main St, Austin, TX 78701"));
    assert_eq!(copy.account_type.as_deref(), Some("SAVINGS"));
    assert_eq!(copy.created_date.as_deref(), Some("2026-05-04"));
}

#[tokio::test]
async fn created_customer_is_readable_through_the_gateway() {
    let h = Harness::new();
    let gateway = MigrationGateway::new(
        h.new_store.clone(),
        h.legacy_store.clone(),
        AdapterTimeouts::default(),
    );
    let created = gateway.create(&sam()).await.expect("create");
    let found = gateway.find(&created.value.id).await.expect("find");
    assert_eq!(found.source, Source::NewDb);
    assert_eq!(found.value, created.value);
    assert_eq!(h.legacy_store.get_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn each_create_mints_a_fresh_id() {
    let h = Harness::new();
    let writer = h.writer(AdapterTimeouts::default());
    let a = writer.create(&sam()).await.expect("first");
    let b = writer.create(&sam()).await.expect("second");
    assert_ne!(a.value.id, b.value.id);
    assert_eq!(h.legacy_store.records.lock().await.len(), 2);
}

#[tokio::test]
async fn missing_name_fails_validation_without_touching_stores() {
    let h = Harness::new();
    let input = CustomerInput {
        name: Some("   ".to_string()),
        email: Some("not-an-email".to_string()),
        ..CustomerInput::default()
    };
    let err = h
        .writer(AdapterTimeouts::default())
        .create(&input)
        .await
        .expect_err("invalid");
    match err {
        GatewayError::Validation(errors) => assert_eq!(errors.fields(), vec!["name", "email"]),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn legacy_failure_keeps_new_record_and_reports_canonical_id() {
    let h = Harness::new();
    *h.legacy_store.fail_put.lock().await = Some(StoreError::unavailable("disk full"));

    let err = h
        .writer(AdapterTimeouts::default())
        .create(&sam())
        .await
        .expect_err("legacy down");
    let GatewayError::PartialFailure(partial) = err else {
        panic!("expected partial failure");
    };
    let minted = partial.canonical_id().cloned().expect("committed id");
    assert!(matches!(partial.legacy_store, LegacyStoreOutcome::Failed(ref e) if e.kind == StoreErrorKind::Unavailable));
    assert!(h
        .new_store
        .get(&minted)
        .await
        .expect("new store get")
        .is_some());
    assert!(h.legacy_store.records.lock().await.is_empty());
}

#[tokio::test]
async fn legacy_timeout_is_partial_failure_with_committed_id() {
    let h = Harness::with_stores(|n| n, |l| l.with_delay(Duration::from_millis(300)));
    let timeouts = AdapterTimeouts {
        new_store: Duration::from_secs(1),
        legacy_store: Duration::from_millis(20),
    };
    let err = h.writer(timeouts).create(&sam()).await.expect_err("slow");
    let GatewayError::PartialFailure(partial) = err else {
        panic!("expected partial failure");
    };
    assert_eq!(
        partial.new_store,
        NewStoreOutcome::Committed(CustomerId::from_sequence(1))
    );
    assert!(matches!(partial.legacy_store, LegacyStoreOutcome::Failed(ref e) if e.kind == StoreErrorKind::Timeout));
}

#[tokio::test]
async fn new_store_failure_skips_legacy_write() {
    let h = Harness::new();
    *h.new_store.fail_put.lock().await = Some(StoreError::unavailable("primary down"));

    let err = h
        .writer(AdapterTimeouts::default())
        .create(&sam())
        .await
        .expect_err("new down");
    let GatewayError::PartialFailure(partial) = err else {
        panic!("expected partial failure");
    };
    assert!(matches!(partial.new_store, NewStoreOutcome::Failed(_)));
    assert_eq!(partial.legacy_store, LegacyStoreOutcome::Skipped);
    assert_eq!(partial.canonical_id(), None);
    assert_eq!(h.legacy_store.put_calls.load(Ordering::Relaxed), 0);
    assert_eq!(h.log.calls(), vec!["new.put"]);
}

#[tokio::test]
async fn new_store_timeout_skips_legacy_write() {
    let h = Harness::with_stores(|n| n.with_delay(Duration::from_millis(300)), |l| l);
    let timeouts = AdapterTimeouts {
        new_store: Duration::from_millis(20),
        legacy_store: Duration::from_secs(1),
    };
    let err = h.writer(timeouts).create(&sam()).await.expect_err("slow");
    let GatewayError::PartialFailure(partial) = err else {
        panic!("expected partial failure");
    };
    assert!(matches!(partial.new_store, NewStoreOutcome::Failed(ref e) if e.kind == StoreErrorKind::Timeout));
    assert_eq!(h.legacy_store.put_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn cancellation_before_start_writes_nothing() {
    let h = Harness::new();
    let (guard, signal) = cancel_pair();
    drop(guard);
    let err = h
        .writer(AdapterTimeouts::default())
        .create_with_cancel(&sam(), &signal)
        .await
        .expect_err("cancelled");
    assert_eq!(err, GatewayError::Cancelled);
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn cancellation_after_commit_aborts_legacy_write_and_keeps_id() {
    let h = Harness::with_stores(|n| n, |l| l.with_delay(Duration::from_millis(500)));
    let writer = Arc::new(h.writer(AdapterTimeouts::default()));
    let (guard, signal) = cancel_pair();

    let task = {
        let writer = Arc::clone(&writer);
        tokio::spawn(async move { writer.create_with_cancel(&sam(), &signal).await })
    };
    // Wait for the legacy write to begin, then let the caller go away.
    for _ in 0..100 {
        if h.legacy_store.put_calls.load(Ordering::Relaxed) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    drop(guard);

    let err = task.await.expect("join").expect_err("cancelled");
    let GatewayError::PartialFailure(partial) = err else {
        panic!("expected partial failure");
    };
    assert_eq!(
        partial.new_store,
        NewStoreOutcome::Committed(CustomerId::from_sequence(1))
    );
    assert_eq!(partial.legacy_store, LegacyStoreOutcome::Cancelled);
    assert_eq!(h.new_store.records.lock().await.len(), 1);
    assert!(h.legacy_store.records.lock().await.is_empty());
}
