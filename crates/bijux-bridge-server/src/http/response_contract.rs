// SPDX-License-Identifier: Apache-2.0

use crate::coordinator::{GatewayError, LegacyStoreOutcome, NewStoreOutcome};
use crate::store::StoreErrorKind;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bijux_bridge_api::error_mapping::{map_error, status_for_code};
use bijux_bridge_api::{ApiError, ApiErrorCode};
use serde_json::json;

#[must_use]
pub(crate) fn api_error_status(code: ApiErrorCode) -> StatusCode {
    StatusCode::from_u16(status_for_code(code)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Flat error body. Retryable errors carry `retry-after`.
#[must_use]
pub(crate) fn api_error_response(err: ApiError, request_id: &str) -> Response {
    let status = api_error_status(err.code);
    let retryable = map_error(&err).retryable;
    let mut resp = (status, Json(err.with_request_id(request_id))).into_response();
    if retryable {
        resp.headers_mut()
            .insert("retry-after", HeaderValue::from_static("3"));
    }
    resp
}

fn legacy_outcome_label(outcome: &LegacyStoreOutcome) -> &'static str {
    match outcome {
        LegacyStoreOutcome::Written => "written",
        LegacyStoreOutcome::Failed(_) => "failed",
        LegacyStoreOutcome::Skipped => "skipped",
        LegacyStoreOutcome::Cancelled => "cancelled",
    }
}

#[must_use]
pub(crate) fn gateway_error_to_api(err: &GatewayError) -> ApiError {
    match err {
        GatewayError::Validation(errors) => ApiError::validation_failed(errors),
        GatewayError::NotFound(id) => ApiError::customer_not_found(id.as_str()),
        GatewayError::UpstreamUnavailable { side, error } => {
            ApiError::upstream_unavailable(side.as_str(), &error.to_string())
        }
        GatewayError::PartialFailure(partial) => match &partial.new_store {
            NewStoreOutcome::Committed(id) => {
                let reason = match &partial.legacy_store {
                    LegacyStoreOutcome::Failed(e) => e.to_string(),
                    other => legacy_outcome_label(other).to_string(),
                };
                ApiError::new(
                    ApiErrorCode::PartialWriteFailure,
                    format!(
                        "Customer {id} was created in the new store but the legacy store write did not complete"
                    ),
                    json!({
                        "canonical_id": id.as_str(),
                        "new_store": "committed",
                        "legacy_store": legacy_outcome_label(&partial.legacy_store),
                        "reason": reason,
                    }),
                    "req-unknown",
                )
            }
            // A timed-out write may still commit after the budget elapses.
            NewStoreOutcome::Failed(error) if error.kind == StoreErrorKind::Timeout => {
                ApiError::new(
                    ApiErrorCode::UpstreamStoreUnavailable,
                    "new store write timed out; outcome unknown",
                    json!({
                        "store": "new",
                        "reason": error.to_string(),
                        "new_store": "unknown",
                        "legacy_store": legacy_outcome_label(&partial.legacy_store),
                    }),
                    "req-unknown",
                )
            }
            NewStoreOutcome::Failed(error) => ApiError::new(
                ApiErrorCode::UpstreamStoreUnavailable,
                "new store unavailable; customer was not created",
                json!({
                    "store": "new",
                    "reason": error.to_string(),
                    "new_store": "failed",
                    "legacy_store": legacy_outcome_label(&partial.legacy_store),
                }),
                "req-unknown",
            ),
        },
        GatewayError::Cancelled => ApiError::new(
            ApiErrorCode::Cancelled,
            "request cancelled",
            json!({}),
            "req-unknown",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{PartialFailure, StoreSide};
    use crate::store::StoreError;
    use bijux_bridge_model::CustomerId;

    #[test]
    fn committed_partial_failure_is_bad_gateway_with_canonical_id() {
        let err = GatewayError::PartialFailure(PartialFailure {
            new_store: NewStoreOutcome::Committed(CustomerId::from_sequence(7)),
            legacy_store: LegacyStoreOutcome::Failed(StoreError::unavailable("down")),
        });
        let api = gateway_error_to_api(&err);
        assert_eq!(api.code, ApiErrorCode::PartialWriteFailure);
        assert_eq!(api_error_status(api.code), StatusCode::BAD_GATEWAY);
        assert_eq!(api.details["canonical_id"], "NEW000007");
        assert_eq!(api.details["legacy_store"], "failed");
    }

    #[test]
    fn failed_new_store_write_is_service_unavailable() {
        let err = GatewayError::PartialFailure(PartialFailure {
            new_store: NewStoreOutcome::Failed(StoreError::unavailable("refused")),
            legacy_store: LegacyStoreOutcome::Skipped,
        });
        let api = gateway_error_to_api(&err);
        assert_eq!(api.details["new_store"], "failed");
        assert_eq!(api.message, "new store unavailable; customer was not created");
        let resp = api_error_response(api, "req-1");
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            resp.headers().get("retry-after").and_then(|v| v.to_str().ok()),
            Some("3")
        );
    }

    #[test]
    fn timed_out_new_store_write_reports_unknown_outcome_without_retry_after() {
        let err = GatewayError::PartialFailure(PartialFailure {
            new_store: NewStoreOutcome::Failed(StoreError::timeout("slow")),
            legacy_store: LegacyStoreOutcome::Skipped,
        });
        let api = gateway_error_to_api(&err);
        assert_eq!(api.details["new_store"], "unknown");
        assert!(api.message.contains("outcome unknown"));
        assert!(!api.message.contains("not created"));
        let resp = api_error_response(api, "req-1");
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(resp.headers().get("retry-after").is_none());
    }

    #[test]
    fn not_found_and_upstream_map_to_distinct_codes() {
        let not_found = gateway_error_to_api(&GatewayError::NotFound(CustomerId::from_sequence(1)));
        assert_eq!(not_found.message, "Customer with ID NEW000001 not found");
        assert_eq!(api_error_status(not_found.code), StatusCode::NOT_FOUND);

        let upstream = gateway_error_to_api(&GatewayError::UpstreamUnavailable {
            side: StoreSide::Legacy,
            error: StoreError::unavailable("refused"),
        });
        assert_eq!(upstream.details["store"], "legacy");
        assert_eq!(api_error_status(upstream.code), StatusCode::SERVICE_UNAVAILABLE);
    }
}
