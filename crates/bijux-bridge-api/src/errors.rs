// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use bijux_bridge_model::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    ValidationFailed,
    InvalidCustomerId,
    InvalidRequestBody,
    PayloadTooLarge,
    CustomerNotFound,
    UpstreamStoreUnavailable,
    PartialWriteFailure,
    NotReady,
    Cancelled,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "ValidationFailed",
            Self::InvalidCustomerId => "InvalidCustomerId",
            Self::InvalidRequestBody => "InvalidRequestBody",
            Self::PayloadTooLarge => "PayloadTooLarge",
            Self::CustomerNotFound => "CustomerNotFound",
            Self::UpstreamStoreUnavailable => "UpstreamStoreUnavailable",
            Self::PartialWriteFailure => "PartialWriteFailure",
            Self::NotReady => "NotReady",
            Self::Cancelled => "Cancelled",
            Self::Internal => "Internal",
        }
    }
}

/// Error body returned by every non-2xx response.
///
/// `message` sits at the top level so clients can show it without knowing
/// the code vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(
        code: ApiErrorCode,
        message: impl Into<String>,
        details: Value,
        request_id: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: request_id.into(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = request_id.to_string();
        self
    }

    #[must_use]
    pub fn validation_failed(errors: &ValidationErrors) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            errors.to_string(),
            json!({"field_errors": errors.0}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_customer_id(value: &str, reason: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidCustomerId,
            format!("invalid customer id: {reason}"),
            json!({"field_errors":[{"field": "id", "reason": reason, "value": value}]}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn invalid_body(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidRequestBody,
            format!("invalid request body: {reason}"),
            json!({}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn customer_not_found(id: &str) -> Self {
        Self::new(
            ApiErrorCode::CustomerNotFound,
            format!("Customer with ID {id} not found"),
            json!({"id": id}),
            "req-unknown",
        )
    }

    #[must_use]
    pub fn upstream_unavailable(store: &str, reason: &str) -> Self {
        Self::new(
            ApiErrorCode::UpstreamStoreUnavailable,
            format!("{store} store unavailable"),
            json!({"store": store, "reason": reason}),
            "req-unknown",
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

const _: fn() = || {
    fn assert_traits<T: Serialize + for<'de> Deserialize<'de>>() {}
    assert_traits::<ApiErrorCode>();
    assert_traits::<ApiError>();
};
