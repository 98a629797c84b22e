//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Gate `/crypto/*` behind the `X-API-Key` check.
//! - Inject shared application state (`AppState`) into handlers.
//! - Map core errors onto HTTP statuses and `{code, message}` bodies.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
