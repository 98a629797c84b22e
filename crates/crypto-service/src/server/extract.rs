//! Request extractors whose rejections render as the service error body.

use axum::extract::FromRequest;

use super::error::ApiError;

/// `axum::Json` whose rejection is an [`ApiError`] (422, `unprocessable_entity`)
/// instead of axum's plain-text response.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);
