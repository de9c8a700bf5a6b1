// SPDX-License-Identifier: Apache-2.0

use crate::http::request_tracing::extract_request_trace;
use crate::http::response_contract::api_error_response;
use crate::AppState;
use axum::body::Body;
use axum::extract::{MatchedPath, State};
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::Response;
use bijux_bridge_api::{ApiError, ApiErrorCode, API_ROUTE_CUSTOMER};
use serde_json::json;
use std::time::Instant;
use tracing::Instrument;

/// Opens the `http.request` span, bounds the request by the configured
/// timeout and stamps `x-request-id` on every response.
///
/// Creates are not bounded here: dropping one after the new store commits
/// would lose the canonical id. The two adapter budgets bound them instead.
pub(crate) async fn request_tracing_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |p| p.as_str().to_string());
    let trace = extract_request_trace(request.headers(), &state);
    request.extensions_mut().insert(trace.clone());

    let span = tracing::info_span!(
        "http.request",
        request_id = %trace.request_id,
        correlation_id = trace.correlation_id.as_deref().unwrap_or(""),
        method = %method,
        route = %route,
    );

    let timeout = state.api.request_timeout;
    let is_create = request.method() == Method::POST && route == API_ROUTE_CUSTOMER;
    let mut response = async {
        if is_create {
            return next.run(request).await;
        }
        match tokio::time::timeout(timeout, next.run(request)).await {
            Ok(response) => response,
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "request timed out");
                api_error_response(
                    ApiError::new(
                        ApiErrorCode::UpstreamStoreUnavailable,
                        "request timed out",
                        json!({"reason": "request timeout"}),
                        "req-unknown",
                    ),
                    &trace.request_id,
                )
            }
        }
    }
    .instrument(span.clone())
    .await;

    let status = response.status().as_u16();
    let latency = started.elapsed();
    span.in_scope(|| {
        tracing::info!(
            status,
            latency_ms = latency.as_millis() as u64,
            "request completed"
        );
    });
    state
        .metrics
        .observe_request(&route, status, latency)
        .await;
    if let Ok(value) = axum::http::HeaderValue::from_str(&trace.request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}
