use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::Value;
use std::time::Instant;

use crate::config::MAX_REQUEST_BODY_BYTES;
use crate::state::AppState;

fn should_ignore_path(path: &str) -> bool {
    matches!(path, "/health" | "/health/")
}

fn filter_sensitive_data(mut value: Value) -> Value {
    if let Value::Object(ref mut map) = value {
        let sensitive_fields = [
            "password",
            "old_password",
            "new_password",
            "token",
            "jwt",
            "access_token",
            "refresh_token",
            "refresh",
            "authorization",
            "auth",
            "secret",
            "key",
            "credential",
            "credentials",
        ];

        for field in sensitive_fields {
            if map.contains_key(field) {
                map.insert(field.to_string(), Value::String("[REDACTED]".to_string()));
            }
        }
    }
    value
}

fn filter_sensitive_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered_headers = headers.clone();

    let sensitive_headers = [
        "authorization",
        "cookie",
        "set-cookie",
        "x-auth-token",
        "access-token",
        "refresh-token",
    ];

    for header_name in sensitive_headers {
        if let Ok(name) = header_name.parse::<http::HeaderName>() {
            if filtered_headers.contains_key(&name) {
                filtered_headers.insert(name, HeaderValue::from_static("[REDACTED]"));
            }
        }
    }

    filtered_headers
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false)
}

fn json_or_empty(bytes: &Bytes) -> Value {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(json) => filter_sensitive_data(json),
        Err(_) => Value::Object(serde_json::Map::new()),
    }
}

pub async fn http_logger(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> std::result::Result<impl IntoResponse, (StatusCode, String)> {
    let start_time = Instant::now();

    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = uri.path();
    let version = req.version();
    let req_headers = req.headers().clone();
    let x_request_id = req_headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if should_ignore_path(path) || method == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Multipart uploads are passed through untouched
    let (req, req_body) = if is_json(&req_headers) {
        let (parts, body) = req.into_parts();
        let bytes = buffer_body("request", body, MAX_REQUEST_BODY_BYTES).await?;
        let json_body = json_or_empty(&bytes);
        (Request::from_parts(parts, Body::from(bytes)), json_body)
    } else {
        (req, Value::Object(serde_json::Map::new()))
    };

    let response = next.run(req).await;

    log_response(
        response,
        LogContext {
            state: &state,
            method,
            path,
            x_request_id,
            version,
            req_headers: &req_headers,
            req_body,
            start_time,
        },
    )
    .await
}

struct LogContext<'a> {
    state: &'a AppState,
    method: Method,
    path: &'a str,
    x_request_id: &'a str,
    version: http::Version,
    req_headers: &'a HeaderMap,
    req_body: Value,
    start_time: Instant,
}

async fn log_response(
    mut response: Response,
    ctx: LogContext<'_>,
) -> std::result::Result<Response, (StatusCode, String)> {
    let latency = ctx.start_time.elapsed();
    let status = response.status();
    let res_headers = response.headers().clone();

    let should_log_body = matches!(ctx.method, Method::POST | Method::PUT | Method::PATCH)
        || status.is_client_error()
        || status.is_server_error();
    let res_body = if should_log_body && is_json(&res_headers) {
        let (parts, body) = response.into_parts();
        let bytes = buffer_body("response", body, usize::MAX).await?;
        let json_body = json_or_empty(&bytes);
        response = Response::from_parts(parts, Body::from(bytes));
        json_body
    } else {
        Value::Object(serde_json::Map::new())
    };

    let filtered_req_headers = filter_sensitive_headers(ctx.req_headers);
    let filtered_res_headers = filter_sensitive_headers(&res_headers);

    tracing::info!(
        method = ?ctx.method,
        path = %ctx.path,
        x_request_id = %ctx.x_request_id,
        version = ?ctx.version,
        req_headers = ?filtered_req_headers,
        req_body = %ctx.req_body,
        status = ?status,
        latency_ms = latency.as_millis(),
        latency_micros = latency.as_micros(),
        res_headers = ?filtered_res_headers,
        res_body = %res_body,
        app_env = %ctx.state.config.app_env,
        "HTTP request completed"
    );

    Ok(response)
}

/// Collects at most `limit` bytes; a longer body is rejected with 413.
pub async fn buffer_body(
    direction: &str,
    body: Body,
    limit: usize,
) -> std::result::Result<Bytes, (StatusCode, String)> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("{direction} body exceeds {limit} bytes"),
        )),
        Err(err) => Err((
            StatusCode::BAD_REQUEST,
            format!("failed to read {direction} body: {err}"),
        )),
    }
}
