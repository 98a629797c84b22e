//! [`KeyRegistry`]: thread-safe, in-process registry of master keys.

use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use thiserror::Error;
use zeroize::Zeroizing;

use super::KeyManagement;
use crate::crypto::aead::{self, AeadError, SymmetricKey, NONCE_LEN, TAG_LEN};

/// Byte length of every master key (AES-256).
pub const MASTER_KEY_LEN: usize = 32;

/// Algorithm reported for master keys created by the registry.
pub const MASTER_KEY_ALGORITHM: &str = "AES-256";

/// Algorithm used to wrap DEKs. Pinned: the wrapped-key format has no header.
pub const WRAP_ALGORITHM: &str = "AES-256-GCM";

/// Shortest possible wrapped key: a nonce plus a tag around an empty DEK.
pub const MIN_WRAPPED_LEN: usize = NONCE_LEN + TAG_LEN;

/// Errors produced by the key registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KmsError {
    /// No master key is registered under this id.
    #[error("KMS key not found: {0}")]
    KeyNotFound(String),

    /// A master key is already registered under this id.
    #[error("Key already exists: {0}")]
    KeyAlreadyExists(String),

    /// The wrapped key is too short to hold a nonce and a tag.
    #[error("invalid wrapped key: expected at least {MIN_WRAPPED_LEN} bytes, got {0}")]
    InvalidWrappedKey(usize),

    /// A key id or master key failed validation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The AEAD layer rejected the operation; unwrap reports tag mismatches here.
    #[error(transparent)]
    Aead(#[from] AeadError),
}

/// A DEK wrapped under a master key.
///
/// `bytes` is `nonce (12) || ciphertext || tag (16)`. Offsets are fixed and the
/// algorithm is always [`WRAP_ALGORITHM`]; nothing in the buffer identifies
/// either, so only a registry with the same layout can unwrap it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKey {
    /// Id of the master key that wrapped the DEK.
    pub key_id: String,
    /// Always [`WRAP_ALGORITHM`].
    pub algorithm: &'static str,
    /// Framed wrapped-key bytes.
    pub bytes: Vec<u8>,
}

/// Result of a successful [`KeyManagement::create_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedKey {
    pub key_id: String,
    pub created: bool,
    pub algorithm: &'static str,
}

/// Thread-safe registry of master keys keyed by id.
///
/// Wraps an `Arc<RwLock<HashMap<..>>>` so that:
/// - Wrap and unwrap calls only take the read lock and run concurrently.
/// - `create_key` takes the write lock, making the existence check and the
///   insert one atomic step.
///
/// Master key material never leaves the registry.
#[derive(Clone, Debug, Default)]
pub struct KeyRegistry {
    inner: Arc<RwLock<HashMap<String, SymmetricKey>>>,
}

impl KeyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with one master key.
    ///
    /// # Errors
    ///
    /// Returns [`KmsError::InvalidParameter`] if `key_id` is blank or `key`
    /// is not [`MASTER_KEY_LEN`] bytes.
    pub fn with_master_key(key_id: &str, key: SymmetricKey) -> Result<Self, KmsError> {
        ensure_key_id(key_id)?;
        if key.as_bytes().len() != MASTER_KEY_LEN {
            return Err(KmsError::InvalidParameter(format!(
                "master key must be {MASTER_KEY_LEN} bytes, got {}",
                key.as_bytes().len()
            )));
        }
        let registry = Self::new();
        registry.write().insert(key_id.to_owned(), key);
        Ok(registry)
    }

    #[cfg(test)]
    fn contains(&self, key_id: &str) -> bool {
        self.read().contains_key(key_id)
    }

    // A panic while holding the lock cannot leave the map half-updated (every
    // write is a single insert), so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SymmetricKey>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SymmetricKey>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyManagement for KeyRegistry {
    fn create_key(&self, key_id: &str) -> Result<CreatedKey, KmsError> {
        ensure_key_id(key_id)?;
        let mut keys = self.write();
        if keys.contains_key(key_id) {
            return Err(KmsError::KeyAlreadyExists(key_id.to_owned()));
        }
        keys.insert(key_id.to_owned(), aead::generate_key(MASTER_KEY_LEN)?);
        Ok(CreatedKey {
            key_id: key_id.to_owned(),
            created: true,
            algorithm: MASTER_KEY_ALGORITHM,
        })
    }

    fn wrap_key(&self, key_id: &str, plaintext_key: &[u8]) -> Result<WrappedKey, KmsError> {
        let keys = self.read();
        let master = keys
            .get(key_id)
            .ok_or_else(|| KmsError::KeyNotFound(key_id.to_owned()))?;

        let nonce = aead::generate_nonce(NONCE_LEN);
        let sealed = aead::encrypt(master.as_bytes(), plaintext_key, None, Some(&nonce))?;

        let mut bytes = Vec::with_capacity(NONCE_LEN + sealed.ciphertext.len() + TAG_LEN);
        bytes.extend_from_slice(&sealed.nonce);
        bytes.extend_from_slice(&sealed.ciphertext);
        bytes.extend_from_slice(&sealed.tag);

        Ok(WrappedKey {
            key_id: key_id.to_owned(),
            algorithm: WRAP_ALGORITHM,
            bytes,
        })
    }

    fn unwrap_key(
        &self,
        key_id: &str,
        wrapped_key: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>, KmsError> {
        let keys = self.read();
        let master = keys
            .get(key_id)
            .ok_or_else(|| KmsError::KeyNotFound(key_id.to_owned()))?;

        if wrapped_key.len() < MIN_WRAPPED_LEN {
            return Err(KmsError::InvalidWrappedKey(wrapped_key.len()));
        }
        let (nonce, rest) = wrapped_key.split_at(NONCE_LEN);
        let (ciphertext, tag) = rest.split_at(rest.len() - TAG_LEN);

        let plaintext = aead::decrypt(master.as_bytes(), ciphertext, nonce, tag, None)?;
        Ok(Zeroizing::new(plaintext))
    }

    fn key_count(&self) -> usize {
        self.read().len()
    }
}

fn ensure_key_id(key_id: &str) -> Result<(), KmsError> {
    if key_id.trim().is_empty() {
        return Err(KmsError::InvalidParameter("key id must not be empty".into()));
    }
    Ok(())
}
