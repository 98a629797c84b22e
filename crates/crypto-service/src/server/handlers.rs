//! Axum request handlers for all service endpoints.
//!
//! Binary fields arrive and leave base64-encoded (standard alphabet, padded).
//! Decoded DEKs and plaintexts are held in [`Zeroizing`] buffers so they are
//! wiped when the handler returns.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::protocol::{
    CreateKeyRequest, CreateKeyResponse, DecryptRequest, DecryptResponse, EncryptRequest,
    EncryptResponse, ErrorResponse, GenerateDekRequest, GenerateDekResponse, HashPasswordRequest,
    HashPasswordResponse, HealthResponse, ServiceInfo, UnwrapDekRequest, UnwrapDekResponse,
    VerifyPasswordRequest, VerifyPasswordResponse, WrapDekRequest, WrapDekResponse,
};
use common::ServiceError;
use tracing::{debug, info};
use zeroize::Zeroizing;

use super::error::ApiError;
use super::extract::JsonBody;
use super::state::AppState;
use crate::crypto::{aead, SymmetricKey};

type ApiResult<T> = Result<Json<T>, ApiError>;

/// `POST /crypto/generate-dek` — fresh random DEK of the requested length.
pub async fn generate_dek(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<GenerateDekRequest>,
) -> ApiResult<GenerateDekResponse> {
    let length = req.length.unwrap_or(state.dek_length);
    let dek = aead::generate_key(length)?;
    debug!(length, "generated DEK");
    Ok(Json(GenerateDekResponse {
        dek: STANDARD.encode(dek.as_bytes()),
    }))
}

/// `POST /crypto/encrypt` — AES-GCM seal under a caller-supplied DEK.
///
/// The nonce is always generated server-side. The reported algorithm follows
/// the DEK length.
pub async fn encrypt(JsonBody(req): JsonBody<EncryptRequest>) -> ApiResult<EncryptResponse> {
    let dek = SymmetricKey::from_bytes(&decode_field("dek", &req.dek)?)?;
    let plaintext = decode_field("plaintext", &req.plaintext)?;
    let aad = decode_aad(req.aad.as_deref())?;

    let sealed = aead::encrypt(
        dek.as_bytes(),
        &plaintext,
        aad.as_deref().map(Vec::as_slice),
        None,
    )?;

    Ok(Json(EncryptResponse {
        ciphertext: STANDARD.encode(&sealed.ciphertext),
        nonce: STANDARD.encode(sealed.nonce),
        tag: STANDARD.encode(sealed.tag),
        algorithm: dek.algorithm().into(),
    }))
}

/// `POST /crypto/decrypt` — verify the tag and open a sealed payload.
pub async fn decrypt(JsonBody(req): JsonBody<DecryptRequest>) -> ApiResult<DecryptResponse> {
    let dek = decode_field("dek", &req.dek)?;
    let ciphertext = decode_field("ciphertext", &req.ciphertext)?;
    let nonce = decode_field("nonce", &req.nonce)?;
    let tag = decode_field("tag", &req.tag)?;
    let aad = decode_aad(req.aad.as_deref())?;

    let plaintext = Zeroizing::new(aead::decrypt(
        &dek,
        &ciphertext,
        &nonce,
        &tag,
        aad.as_deref().map(Vec::as_slice),
    )?);

    Ok(Json(DecryptResponse {
        plaintext: STANDARD.encode(plaintext.as_slice()),
    }))
}

/// `POST /crypto/wrap-dek` — wrap a DEK under a master key.
pub async fn wrap_dek(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<WrapDekRequest>,
) -> ApiResult<WrapDekResponse> {
    let key_id = req
        .kms_key_id
        .unwrap_or_else(|| state.default_key_id.to_string());
    let dek = decode_field("dek", &req.dek)?;

    let wrapped = state.kms.wrap_key(&key_id, &dek)?;
    info!(key_id = %wrapped.key_id, dek_len = dek.len(), "wrapped DEK");

    Ok(Json(WrapDekResponse {
        encrypted_dek: STANDARD.encode(&wrapped.bytes),
        kms_key_id: wrapped.key_id,
        algorithm: wrapped.algorithm.into(),
    }))
}

/// `POST /crypto/unwrap-dek` — recover a DEK wrapped by `wrap-dek`.
pub async fn unwrap_dek(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UnwrapDekRequest>,
) -> ApiResult<UnwrapDekResponse> {
    let key_id = req
        .kms_key_id
        .unwrap_or_else(|| state.default_key_id.to_string());
    let wrapped = decode_field("encrypted_dek", &req.encrypted_dek)?;

    let dek = state.kms.unwrap_key(&key_id, &wrapped)?;
    info!(key_id = %key_id, "unwrapped DEK");

    Ok(Json(UnwrapDekResponse {
        dek: STANDARD.encode(dek.as_slice()),
    }))
}

/// `POST /crypto/keys` — register a new master key. `201 Created` on success.
pub async fn create_key(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateKeyRequest>,
) -> Result<(StatusCode, Json<CreateKeyResponse>), ApiError> {
    let created = state.kms.create_key(&req.key_id)?;
    info!(key_id = %created.key_id, "created master key");

    Ok((
        StatusCode::CREATED,
        Json(CreateKeyResponse {
            key_id: created.key_id,
            created: created.created,
            algorithm: created.algorithm.into(),
        }),
    ))
}

/// `POST /crypto/hash-password` — Argon2id PHC hash, computed on the blocking pool.
pub async fn hash_password(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<HashPasswordRequest>,
) -> ApiResult<HashPasswordResponse> {
    let hasher = state.hasher.clone();
    let password = Zeroizing::new(req.password);
    let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| ServiceError::Internal(format!("hashing task failed: {e}")))??;

    Ok(Json(HashPasswordResponse { hash }))
}

/// `POST /crypto/verify-password` — check a password against a PHC hash.
pub async fn verify_password(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<VerifyPasswordRequest>,
) -> ApiResult<VerifyPasswordResponse> {
    let hasher = state.hasher.clone();
    let VerifyPasswordRequest { hash, password } = req;
    let password = Zeroizing::new(password);
    let verdict = tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
        .await
        .map_err(|e| ServiceError::Internal(format!("verification task failed: {e}")))??;

    Ok(Json(VerifyPasswordResponse {
        valid: verdict.valid,
        needs_rehash: verdict.needs_rehash,
    }))
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` while at least one master key is registered.
/// Returns `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let master_keys = state.kms.key_count();

    let (status_code, status_str) = if master_keys > 0 {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        service: state.app_name.to_string(),
        version: env!("CARGO_PKG_VERSION").into(),
        master_keys,
    };
    (status_code, Json(body)).into_response()
}

/// `GET /` — service name, version and route map.
pub async fn root(State(state): State<AppState>) -> Json<ServiceInfo> {
    let endpoints: BTreeMap<String, String> = [
        ("health", "/health"),
        ("generate_dek", "/crypto/generate-dek"),
        ("encrypt", "/crypto/encrypt"),
        ("decrypt", "/crypto/decrypt"),
        ("wrap_dek", "/crypto/wrap-dek"),
        ("unwrap_dek", "/crypto/unwrap-dek"),
        ("create_key", "/crypto/keys"),
        ("hash_password", "/crypto/hash-password"),
        ("verify_password", "/crypto/verify-password"),
    ]
    .into_iter()
    .map(|(name, path)| (name.to_owned(), path.to_owned()))
    .collect();

    Json(ServiceInfo {
        service: state.app_name.to_string(),
        version: env!("CARGO_PKG_VERSION").into(),
        endpoints,
    })
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

fn decode_field(field: &str, value: &str) -> Result<Zeroizing<Vec<u8>>, ApiError> {
    STANDARD
        .decode(value)
        .map(Zeroizing::new)
        .map_err(|_| ApiError(ServiceError::BadRequest(format!("{field} is not valid base64"))))
}

// An empty string counts as no AAD.
fn decode_aad(value: Option<&str>) -> Result<Option<Zeroizing<Vec<u8>>>, ApiError> {
    match value {
        None | Some("") => Ok(None),
        Some(v) => decode_field("aad", v).map(Some),
    }
}
