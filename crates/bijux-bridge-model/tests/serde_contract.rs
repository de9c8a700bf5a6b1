use bijux_bridge_model::{AccountType, Customer, CustomerId, Source};
use serde_json::json;

#[test]
fn enums_use_screaming_snake_case_on_the_wire() {
    assert_eq!(
        serde_json::to_value(AccountType::Checking).expect("json"),
        json!("CHECKING")
    );
    assert_eq!(serde_json::to_value(Source::LegacyDb).expect("json"), json!("LEGACY_DB"));
    let parsed: Source = serde_json::from_value(json!("NEW_DB")).expect("parse");
    assert_eq!(parsed, Source::NewDb);
}

#[test]
fn customer_id_is_validated_on_deserialize() {
    let ok: CustomerId = serde_json::from_value(json!("NEW000001")).expect("valid id");
    assert_eq!(ok.as_str(), "NEW000001");
    assert!(serde_json::from_value::<CustomerId>(json!("a/b")).is_err());
}

#[test]
fn absent_optional_fields_serialize_as_null() {
    let customer = Customer {
        id: CustomerId::parse("1").expect("id"),
        name: "Jane Doe".to_string(),
        contact: Default::default(),
        address: Default::default(),
        account_type: None,
    };
    let value = serde_json::to_value(&customer).expect("json");
    assert_eq!(value["contact"]["email"], serde_json::Value::Null);
    assert_eq!(value["address"]["street"], serde_json::Value::Null);
    assert_eq!(value["account_type"], serde_json::Value::Null);
    let back: Customer = serde_json::from_value(value).expect("parse back");
    assert_eq!(back, customer);
}
