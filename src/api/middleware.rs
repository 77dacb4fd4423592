//! Request middleware: timing, CORS, and a per-request timeout.

use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use opentelemetry::KeyValue;

use super::error::ApiError;
use crate::error::Error;
use crate::telemetry::metrics;

/// Log and measure every request.
pub async fn observe(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
    let status = response.status();
    metrics::http_duration_ms().record(
        elapsed_ms,
        &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", i64::from(status.as_u16())),
        ],
    );
    tracing::debug!(%method, %path, status = status.as_u16(), elapsed_ms, "request");
    response
}

/// Permissive CORS: any origin, Authorization header, the methods we route.
pub async fn cors(req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Authorization, Content-Type"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, OPTIONS, DELETE"),
    );
    response
}

/// Abort requests that run longer than the configured limit. The progress
/// write is a single statement, so a cancelled completion leaves the task
/// either advanced once or untouched.
pub async fn timeout(State(limit): State<Duration>, req: Request, next: Next) -> Response {
    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            let err = Error::Other(format!("request exceeded {}s", limit.as_secs()));
            let mut response = ApiError(err).into_response();
            *response.status_mut() = StatusCode::GATEWAY_TIMEOUT;
            response
        }
    }
}
