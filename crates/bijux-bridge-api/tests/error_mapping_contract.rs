use bijux_bridge_api::error_mapping::{map_error, status_for_code, API_ERROR_SCHEMA_REF};
use bijux_bridge_api::{ApiError, ApiErrorCode};
use bijux_bridge_model::{CustomerInput, ValidationErrors};
use serde_json::{json, Value};

#[test]
fn api_error_mapping_is_centralized_and_stable() {
    let cases = [
        (ApiErrorCode::ValidationFailed, 400),
        (ApiErrorCode::InvalidCustomerId, 400),
        (ApiErrorCode::InvalidRequestBody, 400),
        (ApiErrorCode::CustomerNotFound, 404),
        (ApiErrorCode::PayloadTooLarge, 413),
        (ApiErrorCode::PartialWriteFailure, 502),
        (ApiErrorCode::UpstreamStoreUnavailable, 503),
        (ApiErrorCode::NotReady, 503),
        (ApiErrorCode::Internal, 500),
    ];
    for (code, status) in cases {
        assert_eq!(status_for_code(code), status, "{code:?}");
    }
    let mapped = map_error(&ApiError::new(
        ApiErrorCode::UpstreamStoreUnavailable,
        "down",
        json!({}),
        "req-1",
    ));
    assert!(mapped.retryable);
    assert_eq!(mapped.schema_ref, API_ERROR_SCHEMA_REF);
}

#[test]
fn error_body_exposes_top_level_message() {
    let err = ApiError::customer_not_found("42").with_request_id("req-9");
    let value = serde_json::to_value(&err).expect("json");
    assert_eq!(value["message"], json!("Customer with ID 42 not found"));
    assert_eq!(value["code"], json!("CustomerNotFound"));
    assert_eq!(value["request_id"], json!("req-9"));
}

#[test]
fn validation_error_lists_offending_fields() {
    let errors: ValidationErrors = CustomerInput::default().validate().expect_err("no name");
    let err = ApiError::validation_failed(&errors);
    let value = serde_json::to_value(&err).expect("json");
    let fields: Vec<&str> = value["details"]["field_errors"]
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|e| e.get("field").and_then(Value::as_str))
        .collect();
    assert_eq!(fields, vec!["name"]);
    assert!(err.message.contains("name"));
}

#[test]
fn unknown_write_outcome_is_not_retryable() {
    let mapped = map_error(&ApiError::new(
        ApiErrorCode::UpstreamStoreUnavailable,
        "new store write timed out; outcome unknown",
        json!({"store": "new", "new_store": "unknown", "legacy_store": "skipped"}),
        "req-1",
    ));
    assert_eq!(mapped.status_code, 503);
    assert!(!mapped.retryable);
}
