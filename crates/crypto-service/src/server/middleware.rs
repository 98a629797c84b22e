//! Axum middleware applied to the router.
//!
//! Includes the `X-API-Key` gate for `/crypto/*` and the `X-Process-Time`
//! response header. Tracing, timeout and compression come from `tower-http`
//! and are attached in [`super::router`].

use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use common::ServiceError;
use sha2::{Digest, Sha256};
use tracing::warn;

use super::error::ApiError;
use super::state::AppState;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the caller's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Response header carrying handler duration in seconds.
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Reject requests whose `X-API-Key` is missing (401) or wrong (403).
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let rejection = match request.headers().get(API_KEY_HEADER) {
        None => Some(ServiceError::Unauthorized("missing API key".into())),
        Some(v) if v.as_bytes().is_empty() => {
            Some(ServiceError::Unauthorized("missing API key".into()))
        }
        Some(v) if !api_key_matches(&state.api_key_digest, v.as_bytes()) => {
            warn!(path = %request.uri().path(), "rejected request with invalid API key");
            Some(ServiceError::Forbidden("invalid API key".into()))
        }
        Some(_) => None,
    };

    match rejection {
        Some(err) => ApiError(err).into_response(),
        None => next.run(request).await,
    }
}

/// Stamp every response with the time spent producing it.
pub async fn process_time(request: Request, next: Next) -> Response {
    let started = Instant::now();
    let mut response = next.run(request).await;
    let elapsed = started.elapsed().as_secs_f64();
    if let Ok(value) = HeaderValue::from_str(&format!("{elapsed:.6}")) {
        response.headers_mut().insert(PROCESS_TIME_HEADER, value);
    }
    response
}

/// Digest-then-compare, so neither content nor length of the configured key
/// leaks through timing.
fn api_key_matches(expected_digest: &[u8; 32], provided: &[u8]) -> bool {
    let provided_digest = Sha256::digest(provided);
    expected_digest
        .iter()
        .zip(provided_digest.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
