//! Axum router construction.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use super::{handlers, middleware, state::AppState};

/// Build the application [`Router`] with all routes and middleware attached.
///
/// Every `/crypto/*` route sits behind the API-key check; `/` and `/health`
/// are public.
pub fn build(state: AppState) -> Router {
    let crypto = Router::new()
        .route("/generate-dek", post(handlers::generate_dek))
        .route("/encrypt", post(handlers::encrypt))
        .route("/decrypt", post(handlers::decrypt))
        .route("/wrap-dek", post(handlers::wrap_dek))
        .route("/unwrap-dek", post(handlers::unwrap_dek))
        .route("/keys", post(handlers::create_key))
        .route("/hash-password", post(handlers::hash_password))
        .route("/verify-password", post(handlers::verify_password))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_api_key));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .nest("/crypto", crypto)
        .fallback(handlers::not_found)
        .layer(from_fn(middleware::process_time))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(middleware::REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .with_state(state)
}
