// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::http::HeaderMap;

const MAX_TRACE_HEADER_BYTES: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTrace {
    pub request_id: String,
    pub correlation_id: Option<String>,
}

fn trace_header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_TRACE_HEADER_BYTES)
        .map(ToString::to_string)
}

#[must_use]
pub(crate) fn extract_request_trace(headers: &HeaderMap, state: &AppState) -> RequestTrace {
    let request_id = trace_header(headers, "x-request-id").unwrap_or_else(|| {
        let id = state
            .request_id_seed
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("req-{id:016x}")
    });
    RequestTrace {
        request_id,
        correlation_id: trace_header(headers, "x-correlation-id"),
    }
}
