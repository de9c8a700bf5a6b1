// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const MAX_ORIGIN_BYTES: usize = 256;

fn allowed_origin(state: &AppState, origin: &str) -> Option<HeaderValue> {
    let origins = &state.api.cors_allowed_origins;
    if origins.iter().any(|o| o == "*") {
        return Some(HeaderValue::from_static("*"));
    }
    if origins.iter().any(|o| o == origin) {
        return HeaderValue::from_str(origin).ok();
    }
    None
}

pub(crate) async fn cors_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let origin = req
        .headers()
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_ORIGIN_BYTES)
        .map(ToString::to_string);
    let allow = origin.as_deref().and_then(|o| allowed_origin(&state, o));

    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        if let Some(value) = allow {
            resp.headers_mut()
                .insert("access-control-allow-origin", value);
            resp.headers_mut().insert(
                "access-control-allow-methods",
                HeaderValue::from_static("GET,POST,OPTIONS"),
            );
            resp.headers_mut().insert(
                "access-control-allow-headers",
                HeaderValue::from_static("content-type,x-request-id,x-correlation-id"),
            );
        }
        return resp;
    }

    let mut resp = next.run(req).await;
    if let Some(value) = allow {
        resp.headers_mut()
            .insert("access-control-allow-origin", value);
        resp.headers_mut()
            .insert("vary", HeaderValue::from_static("Origin"));
    }
    resp
}
