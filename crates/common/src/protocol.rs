//! Request and response types exchanged with callers of the crypto service.
//!
//! Every binary field (keys, plaintexts, ciphertexts, nonces, tags, wrapped
//! keys) crosses the boundary as standard padded base64. The service core
//! operates on raw bytes; decoding happens in the HTTP handlers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Envelope encryption
// ---------------------------------------------------------------------------

/// Request body for `POST /crypto/generate-dek`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateDekRequest {
    /// Key length in bytes (16, 24 or 32). Defaults to the configured DEK length.
    #[serde(default)]
    pub length: Option<usize>,
}

/// Response body for `POST /crypto/generate-dek`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDekResponse {
    /// Base64-encoded DEK.
    pub dek: String,
}

/// Request body for `POST /crypto/encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptRequest {
    /// Base64-encoded DEK.
    pub dek: String,
    /// Base64-encoded plaintext.
    pub plaintext: String,
    /// Base64-encoded associated data. Absent or empty means no AAD.
    #[serde(default)]
    pub aad: Option<String>,
}

/// Response body for `POST /crypto/encrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptResponse {
    /// Base64-encoded ciphertext, same length as the plaintext.
    pub ciphertext: String,
    /// Base64-encoded 12-byte nonce.
    pub nonce: String,
    /// Base64-encoded 16-byte authentication tag.
    pub tag: String,
    /// Algorithm applied, e.g. `"AES-256-GCM"`.
    pub algorithm: String,
}

/// Request body for `POST /crypto/decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptRequest {
    pub dek: String,
    pub ciphertext: String,
    pub nonce: String,
    pub tag: String,
    #[serde(default)]
    pub aad: Option<String>,
}

/// Response body for `POST /crypto/decrypt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptResponse {
    /// Base64-encoded plaintext.
    pub plaintext: String,
}

/// Request body for `POST /crypto/wrap-dek`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapDekRequest {
    /// Base64-encoded DEK to wrap.
    pub dek: String,
    /// Master key id. Defaults to the configured `KMS_KEY_ID`.
    #[serde(default)]
    pub kms_key_id: Option<String>,
}

/// Response body for `POST /crypto/wrap-dek`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrapDekResponse {
    /// Base64 of `nonce || ciphertext || tag`.
    pub encrypted_dek: String,
    pub kms_key_id: String,
    pub algorithm: String,
}

/// Request body for `POST /crypto/unwrap-dek`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnwrapDekRequest {
    pub encrypted_dek: String,
    #[serde(default)]
    pub kms_key_id: Option<String>,
}

/// Response body for `POST /crypto/unwrap-dek`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnwrapDekResponse {
    pub dek: String,
}

/// Request body for `POST /crypto/keys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateKeyRequest {
    pub key_id: String,
}

/// Response body for `POST /crypto/keys`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateKeyResponse {
    pub key_id: String,
    pub created: bool,
    pub algorithm: String,
}

// ---------------------------------------------------------------------------
// Password hashing
// ---------------------------------------------------------------------------

/// Request body for `POST /crypto/hash-password`.
#[derive(Clone, Serialize, Deserialize)]
pub struct HashPasswordRequest {
    pub password: String,
}

impl std::fmt::Debug for HashPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("HashPasswordRequest { password: [REDACTED] }")
    }
}

/// Response body for `POST /crypto/hash-password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashPasswordResponse {
    /// PHC-format Argon2id hash string (embeds salt and parameters).
    pub hash: String,
}

/// Request body for `POST /crypto/verify-password`.
#[derive(Clone, Serialize, Deserialize)]
pub struct VerifyPasswordRequest {
    pub hash: String,
    pub password: String,
}

impl std::fmt::Debug for VerifyPasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyPasswordRequest")
            .field("hash", &self.hash)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Response body for `POST /crypto/verify-password`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPasswordResponse {
    pub valid: bool,
    pub needs_rehash: bool,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.message())
    }
}

// ---------------------------------------------------------------------------
// Health check and service info
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status: `"healthy"` or `"degraded"`.
    pub status: String,
    pub service: String,
    pub version: String,
    /// Number of master keys currently registered.
    pub master_keys: usize,
}

/// Response body for `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    /// Endpoint name → path.
    pub endpoints: BTreeMap<String, String>,
}
