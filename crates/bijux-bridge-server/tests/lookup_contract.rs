use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use bijux_bridge_model::{
    to_unified, AccountType, Customer, CustomerDraft, CustomerId, LegacyCustomer, Source,
};
use bijux_bridge_server::{
    AdapterTimeouts, FakeLegacyStore, FakeNewStore, GatewayError, LookupCoordinator, StoreError,
    StoreErrorKind, StoreSide,
};

fn id(raw: &str) -> CustomerId {
    CustomerId::parse(raw).expect("customer id")
}

fn jane_legacy() -> LegacyCustomer {
    LegacyCustomer {
        customer_id: id("42"),
        full_name: "Jane Doe".to_string(),
        email: None,
        phone_number: None,
        address: Some("12 Oak Ave, Austin".to_string()),
        account_type: None,
        created_date: Some("2019-04-01".to_string()),
    }
}

fn modern(raw_id: &str, name: &str) -> Customer {
    Customer::from_draft(
        id(raw_id),
        CustomerDraft {
            name: name.to_string(),
            contact: Default::default(),
            address: Default::default(),
            account_type: AccountType::Checking,
        },
    )
}

fn coordinator(
    new_store: &Arc<FakeNewStore>,
    legacy_store: &Arc<FakeLegacyStore>,
    timeouts: AdapterTimeouts,
) -> LookupCoordinator {
    LookupCoordinator::new(new_store.clone(), legacy_store.clone(), timeouts)
}

#[tokio::test]
async fn new_store_hit_never_touches_legacy() {
    let new_store = Arc::new(FakeNewStore::default());
    let legacy_store = Arc::new(FakeLegacyStore::default());
    new_store.seed(modern("NEW000001", "Sam Lee")).await;
    legacy_store
        .seed(LegacyCustomer {
            customer_id: id("NEW000001"),
            ..jane_legacy()
        })
        .await;

    let found = coordinator(&new_store, &legacy_store, AdapterTimeouts::default())
        .find(&id("NEW000001"))
        .await
        .expect("found");
    assert_eq!(found.source, Source::NewDb);
    assert_eq!(found.value.name, "Sam Lee");
    assert_eq!(new_store.get_calls.load(Ordering::Relaxed), 1);
    assert_eq!(legacy_store.get_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn legacy_only_customer_is_transformed_and_tagged() {
    let new_store = Arc::new(FakeNewStore::default());
    let legacy_store = Arc::new(FakeLegacyStore::default());
    legacy_store.seed(jane_legacy()).await;

    let found = coordinator(&new_store, &legacy_store, AdapterTimeouts::default())
        .find(&id("42"))
        .await
        .expect("found");
    assert_eq!(found.source, Source::LegacyDb);
    assert_eq!(found.value, to_unified(&jane_legacy()));
    assert_eq!(found.value.id.as_str(), "42");
    assert_eq!(found.value.name, "Jane Doe");
    assert_eq!(found.value.address.street.as_deref(), Some("12 Oak Ave"));
    assert_eq!(found.value.address.city.as_deref(), Some("Austin"));
    assert_eq!(new_store.get_calls.load(Ordering::Relaxed), 1);
    assert_eq!(legacy_store.get_calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn absent_from_both_is_not_found() {
    let new_store = Arc::new(FakeNewStore::default());
    let legacy_store = Arc::new(FakeLegacyStore::default());
    let err = coordinator(&new_store, &legacy_store, AdapterTimeouts::default())
        .find(&id("missing-1"))
        .await
        .expect_err("absent");
    assert_eq!(err, GatewayError::NotFound(id("missing-1")));
}

#[tokio::test]
async fn legacy_hit_is_not_backfilled_into_new_store() {
    let new_store = Arc::new(FakeNewStore::default());
    let legacy_store = Arc::new(FakeLegacyStore::default());
    legacy_store.seed(jane_legacy()).await;
    let lookup = coordinator(&new_store, &legacy_store, AdapterTimeouts::default());
    lookup.find(&id("42")).await.expect("first");
    lookup.find(&id("42")).await.expect("second");
    assert_eq!(new_store.put_calls.load(Ordering::Relaxed), 0);
    assert_eq!(legacy_store.get_calls.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn new_store_error_is_upstream_unavailable_without_fallback() {
    let new_store = Arc::new(FakeNewStore::default());
    let legacy_store = Arc::new(FakeLegacyStore::default());
    legacy_store.seed(jane_legacy()).await;
    *new_store.fail_get.lock().await = Some(StoreError::unavailable("connection refused"));

    let err = coordinator(&new_store, &legacy_store, AdapterTimeouts::default())
        .find(&id("42"))
        .await
        .expect_err("new store down");
    match err {
        GatewayError::UpstreamUnavailable { side, error } => {
            assert_eq!(side, StoreSide::New);
            assert_eq!(error.kind, StoreErrorKind::Unavailable);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(legacy_store.get_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn new_store_timeout_is_upstream_unavailable_without_fallback() {
    let new_store = Arc::new(FakeNewStore::default().with_delay(Duration::from_millis(300)));
    let legacy_store = Arc::new(FakeLegacyStore::default());
    legacy_store.seed(jane_legacy()).await;
    let timeouts = AdapterTimeouts {
        new_store: Duration::from_millis(20),
        legacy_store: Duration::from_secs(1),
    };

    let err = coordinator(&new_store, &legacy_store, timeouts)
        .find(&id("42"))
        .await
        .expect_err("new store slow");
    match err {
        GatewayError::UpstreamUnavailable { side, error } => {
            assert_eq!(side, StoreSide::New);
            assert_eq!(error.kind, StoreErrorKind::Timeout);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(legacy_store.get_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn legacy_error_after_miss_is_upstream_unavailable() {
    let new_store = Arc::new(FakeNewStore::default());
    let legacy_store = Arc::new(FakeLegacyStore::default());
    *legacy_store.fail_get.lock().await = Some(StoreError::corrupt("bad row"));

    let err = coordinator(&new_store, &legacy_store, AdapterTimeouts::default())
        .find(&id("42"))
        .await
        .expect_err("legacy down");
    assert!(matches!(
        err,
        GatewayError::UpstreamUnavailable {
            side: StoreSide::Legacy,
            ..
        }
    ));
}

#[tokio::test]
async fn legacy_timeout_after_miss_is_upstream_unavailable() {
    let new_store = Arc::new(FakeNewStore::default());
    let legacy_store = Arc::new(FakeLegacyStore::default().with_delay(Duration::from_millis(300)));
    legacy_store.seed(jane_legacy()).await;
    let timeouts = AdapterTimeouts {
        new_store: Duration::from_secs(1),
        legacy_store: Duration::from_millis(20),
    };

    let err = coordinator(&new_store, &legacy_store, timeouts)
        .find(&id("42"))
        .await
        .expect_err("legacy slow");
    match err {
        GatewayError::UpstreamUnavailable { side, error } => {
            assert_eq!(side, StoreSide::Legacy);
            assert_eq!(error.kind, StoreErrorKind::Timeout);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
