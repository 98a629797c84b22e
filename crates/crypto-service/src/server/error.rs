//! Conversion of core errors into HTTP error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{protocol::ErrorResponse, ServiceError};
use tracing::{debug, error};

use crate::crypto::AeadError;
use crate::kms::KmsError;
use crate::password::PasswordError;

/// Message returned for every failed tag check. Carries no detail about
/// which input was wrong.
pub const DECRYPTION_FAILED: &str = "decryption failed";

/// Handler error: a [`ServiceError`] rendered as `{code, message}` JSON.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            debug!(error = %self.0, "request rejected");
        }
        (status, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ServiceError::UnprocessableEntity(rejection.body_text()))
    }
}

impl From<AeadError> for ApiError {
    fn from(err: AeadError) -> Self {
        Self(aead_to_service(err))
    }
}

impl From<KmsError> for ApiError {
    fn from(err: KmsError) -> Self {
        let mapped = match err {
            KmsError::KeyNotFound(_) => ServiceError::NotFound(err.to_string()),
            KmsError::KeyAlreadyExists(_) => ServiceError::Conflict(err.to_string()),
            KmsError::InvalidWrappedKey(_) | KmsError::InvalidParameter(_) => {
                ServiceError::BadRequest(err.to_string())
            }
            KmsError::Aead(inner) => aead_to_service(inner),
        };
        Self(mapped)
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        let mapped = match err {
            PasswordError::InvalidParameter(_) | PasswordError::InvalidHash => {
                ServiceError::BadRequest(err.to_string())
            }
            PasswordError::Hashing(_) => ServiceError::Internal(err.to_string()),
        };
        Self(mapped)
    }
}

fn aead_to_service(err: AeadError) -> ServiceError {
    match err {
        AeadError::InvalidParameter(msg) => ServiceError::BadRequest(msg),
        AeadError::AuthenticationFailure => ServiceError::BadRequest(DECRYPTION_FAILED.into()),
        AeadError::AeadFailure => ServiceError::Internal("encryption failed".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: impl Into<ApiError>) -> u16 {
        err.into().0.http_status()
    }

    #[test]
    fn kms_errors_map_to_statuses() {
        assert_eq!(status_of(KmsError::KeyNotFound("x".into())), 404);
        assert_eq!(status_of(KmsError::KeyAlreadyExists("x".into())), 409);
        assert_eq!(status_of(KmsError::InvalidWrappedKey(10)), 400);
        assert_eq!(
            status_of(KmsError::Aead(AeadError::AuthenticationFailure)),
            400
        );
    }

    #[test]
    fn authentication_failure_hides_detail() {
        let ApiError(err) = AeadError::AuthenticationFailure.into();
        assert_eq!(err.message(), DECRYPTION_FAILED);

        let ApiError(err) = KmsError::Aead(AeadError::AuthenticationFailure).into();
        assert_eq!(err.message(), DECRYPTION_FAILED);
    }

    #[test]
    fn password_errors_map_to_statuses() {
        assert_eq!(status_of(PasswordError::InvalidHash), 400);
        assert_eq!(status_of(PasswordError::InvalidParameter("x".into())), 400);
        assert_eq!(status_of(PasswordError::Hashing("x".into())), 500);
    }

    #[test]
    fn aead_failure_is_internal() {
        assert_eq!(status_of(AeadError::AeadFailure), 500);
        assert_eq!(status_of(AeadError::InvalidParameter("bad".into())), 400);
    }
}
