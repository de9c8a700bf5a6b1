// SPDX-License-Identifier: Apache-2.0

use crate::coordinator::cancel_pair;
use crate::http::request_tracing::RequestTrace;
use crate::http::response_contract::{api_error_response, gateway_error_to_api};
use crate::AppState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use bijux_bridge_api::{
    openapi_v1_spec, ApiError, ApiErrorCode, CustomerRequestDto, CustomerResponseDto,
    MigrationStatsDto,
};
use bijux_bridge_model::{CustomerId, CustomerInput};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{error, info};

pub const CREATED_MESSAGE: &str = "Customer created in both stores";

fn request_id(trace: &Option<Extension<RequestTrace>>) -> &str {
    trace
        .as_ref()
        .map_or("req-unknown", |Extension(t)| t.request_id.as_str())
}

pub(crate) async fn get_customer_handler(
    State(state): State<AppState>,
    trace: Option<Extension<RequestTrace>>,
    Path(raw_id): Path<String>,
) -> Response {
    let request_id = request_id(&trace);
    let id = match CustomerId::parse(&raw_id) {
        Ok(id) => id,
        Err(e) => {
            return api_error_response(ApiError::invalid_customer_id(&raw_id, &e.0), request_id)
        }
    };
    match state.gateway.find(&id).await {
        Ok(found) => (StatusCode::OK, Json(CustomerResponseDto::from(found))).into_response(),
        Err(err) => api_error_response(gateway_error_to_api(&err), request_id),
    }
}

/// The create runs on its own task so that a disconnecting client cannot
/// drop it between the two store writes. The task observes the
/// disconnect through the cancel signal instead.
pub(crate) async fn create_customer_handler(
    State(state): State<AppState>,
    trace: Option<Extension<RequestTrace>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = request_id(&trace).to_string();
    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return api_error_response(
                ApiError::new(
                    ApiErrorCode::PayloadTooLarge,
                    "request body too large",
                    json!({"max_body_bytes": state.api.max_body_bytes}),
                    "req-unknown",
                ),
                &request_id,
            );
        }
        Err(rejection) => {
            return api_error_response(
                ApiError::invalid_body(&rejection.body_text()),
                &request_id,
            )
        }
    };
    let dto: CustomerRequestDto = match serde_json::from_slice(&body) {
        Ok(dto) => dto,
        Err(e) => return api_error_response(ApiError::invalid_body(&e.to_string()), &request_id),
    };
    let input = CustomerInput::from(dto);

    let (guard, signal) = cancel_pair();
    let gateway = Arc::clone(&state.gateway);
    let task = tokio::spawn(async move { gateway.create_with_cancel(&input, &signal).await });
    let joined = task.await;
    guard.disarm();

    match joined {
        Ok(Ok(created)) => {
            info!(customer_id = %created.value.id, "customer created");
            (
                StatusCode::CREATED,
                Json(CustomerResponseDto::from(created).with_message(CREATED_MESSAGE)),
            )
                .into_response()
        }
        Ok(Err(err)) => api_error_response(gateway_error_to_api(&err), &request_id),
        Err(join_err) => {
            error!(error = %join_err, "create task failed");
            api_error_response(
                ApiError::new(
                    ApiErrorCode::Internal,
                    "internal error",
                    json!({}),
                    "req-unknown",
                ),
                &request_id,
            )
        }
    }
}

pub(crate) async fn stats_handler(
    State(state): State<AppState>,
    trace: Option<Extension<RequestTrace>>,
) -> Response {
    match state.gateway.stats().await {
        Ok(progress) => Json(MigrationStatsDto::from(progress)).into_response(),
        Err(err) => api_error_response(gateway_error_to_api(&err), request_id(&trace)),
    }
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn readyz_handler(
    State(state): State<AppState>,
    trace: Option<Extension<RequestTrace>>,
) -> Response {
    if state.accepting_requests.load(Ordering::Relaxed) {
        (StatusCode::OK, "ready").into_response()
    } else {
        api_error_response(
            ApiError::new(
                ApiErrorCode::NotReady,
                "server is draining",
                json!({}),
                "req-unknown",
            ),
            request_id(&trace),
        )
    }
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> Response {
    let body = state.metrics.render().await;
    let mut resp = (StatusCode::OK, body).into_response();
    resp.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4"),
    );
    resp
}

pub(crate) async fn openapi_handler() -> impl IntoResponse {
    Json(openapi_v1_spec())
}
