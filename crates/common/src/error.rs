//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::BadRequest`] → 400
/// - [`ServiceError::Unauthorized`] → 401
/// - [`ServiceError::Forbidden`] → 403
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Conflict`] → 409
/// - [`ServiceError::UnprocessableEntity`] → 422
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request was malformed: bad base64, invalid key length, truncated
    /// wrapped key, or a ciphertext that failed authentication.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No API key was presented.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An API key was presented but does not match.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The named master key is not registered.
    #[error("not found: {0}")]
    NotFound(String),

    /// The named master key already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The request body is not JSON of the expected shape.
    #[error("unprocessable entity: {0}")]
    UnprocessableEntity(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::BadRequest(_) => 400,
            ServiceError::Unauthorized(_) => 401,
            ServiceError::Forbidden(_) => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::UnprocessableEntity(_) => 422,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::Unauthorized(_) => "unauthorized",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::UnprocessableEntity(_) => "unprocessable_entity",
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// The caller-safe message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::BadRequest(m)
            | ServiceError::Unauthorized(m)
            | ServiceError::Forbidden(m)
            | ServiceError::NotFound(m)
            | ServiceError::Conflict(m)
            | ServiceError::UnprocessableEntity(m)
            | ServiceError::Internal(m) => m,
        }
    }
}
