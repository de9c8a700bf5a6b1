// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

pub const API_ERROR_SCHEMA_REF: &str = "#/components/schemas/ApiError";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
    pub retryable: bool,
    pub schema_ref: &'static str,
}

#[must_use]
pub fn status_for_code(code: ApiErrorCode) -> u16 {
    match code {
        ApiErrorCode::ValidationFailed
        | ApiErrorCode::InvalidCustomerId
        | ApiErrorCode::InvalidRequestBody => 400,
        ApiErrorCode::CustomerNotFound => 404,
        ApiErrorCode::PayloadTooLarge => 413,
        ApiErrorCode::PartialWriteFailure => 502,
        ApiErrorCode::UpstreamStoreUnavailable | ApiErrorCode::NotReady => 503,
        _ => 500,
    }
}

#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    let status_code = status_for_code(error.code);
    // A write whose outcome is unknown may have committed; retrying could mint a duplicate.
    let outcome_unknown =
        error.details.get("new_store").and_then(|v| v.as_str()) == Some("unknown");
    ApiErrorMapping {
        status_code,
        retryable: status_code == 503 && !outcome_unknown,
        schema_ref: API_ERROR_SCHEMA_REF,
    }
}
