//! Master-key management: DEK wrap/unwrap under named master keys.
//!
//! # Lifecycle
//!
//! 1. At startup, [`from_config`] builds the registry with exactly one master
//!    key under `KMS_KEY_ID`. Key material comes from `MASTER_KEY` when set;
//!    otherwise a random key is generated for this process only.
//! 2. Handlers reach the registry through the [`KeyManagement`] trait held in
//!    `AppState`.
//! 3. Further master keys can be added with [`KeyManagement::create_key`].
//!    Nothing is persisted: every master key dies with the process.
//!
//! # Security invariants
//!
//! - Master key material is **never** returned, logged, or included in traces.
//! - Every wrap draws a fresh 96-bit nonce.
//! - Wrapped keys use a fixed `nonce || ciphertext || tag` layout under
//!   AES-256-GCM with no AAD.

pub mod registry;

pub use registry::{CreatedKey, KeyRegistry, KmsError, WrappedKey};

use std::sync::Arc;

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::config::Config;
use crate::crypto::{aead, SymmetricKey};

/// Key-management abstraction consumed by the HTTP layer.
///
/// [`KeyRegistry`] is the only implementation; it stands in for an external
/// KMS and keeps all master keys in process memory.
#[cfg_attr(test, mockall::automock)]
pub trait KeyManagement: Send + Sync {
    /// Register a new master key with fresh 256-bit material.
    fn create_key(&self, key_id: &str) -> Result<CreatedKey, KmsError>;

    /// Encrypt `plaintext_key` under the master key `key_id`.
    fn wrap_key(&self, key_id: &str, plaintext_key: &[u8]) -> Result<WrappedKey, KmsError>;

    /// Verify and decrypt a wrapped key produced by [`KeyManagement::wrap_key`].
    fn unwrap_key(
        &self,
        key_id: &str,
        wrapped_key: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, KmsError>;

    /// Number of registered master keys.
    fn key_count(&self) -> usize;
}

/// Build the key-management backend selected by `cfg.kms_provider`.
///
/// # Errors
///
/// Returns an error if the provider is unsupported, or if `MASTER_KEY` is not
/// valid base64 of exactly 32 bytes.
pub fn from_config(cfg: &Config) -> Result<Arc<dyn KeyManagement>> {
    if cfg.kms_provider != "mock" {
        anyhow::bail!("unsupported KMS provider: {}", cfg.kms_provider);
    }

    let master = match &cfg.master_key {
        Some(encoded) => {
            let raw = Zeroizing::new(
                STANDARD
                    .decode(encoded.trim())
                    .context("MASTER_KEY is not valid base64")?,
            );
            info!(key_id = %cfg.kms_key_id, "master key loaded from configuration");
            SymmetricKey::from_bytes(&raw).context("MASTER_KEY has an invalid length")?
        }
        None => {
            warn!(
                key_id = %cfg.kms_key_id,
                "MASTER_KEY not set; generated an ephemeral master key. \
                 Keys wrapped by this process cannot be unwrapped after a restart"
            );
            aead::generate_key(registry::MASTER_KEY_LEN)?
        }
    };

    let registry = KeyRegistry::with_master_key(&cfg.kms_key_id, master)
        .context("failed to initialise master key registry")?;
    Ok(Arc::new(registry))
}
