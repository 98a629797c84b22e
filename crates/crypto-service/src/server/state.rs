//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::kms::KeyManagement;
use crate::password::Argon2Hasher;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or `Copy`) so that Axum can
/// clone the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Master-key registry used by wrap, unwrap and key creation.
    pub kms: Arc<dyn KeyManagement>,
    /// Argon2id hasher configured from `ARGON2_*`.
    pub hasher: Arc<Argon2Hasher>,
    /// SHA-256 of the configured API key. The plaintext key is not retained.
    pub api_key_digest: Arc<[u8; 32]>,
    /// Master key id used when a wrap/unwrap request names none.
    pub default_key_id: Arc<String>,
    /// DEK length used when a generate request names none.
    pub dek_length: usize,
    /// Service name reported by `/` and `/health`.
    pub app_name: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`] from the registry, hasher and configuration.
    pub fn new(kms: Arc<dyn KeyManagement>, hasher: Argon2Hasher, cfg: &Config) -> Self {
        Self {
            kms,
            hasher: Arc::new(hasher),
            api_key_digest: Arc::new(Sha256::digest(cfg.api_key.as_bytes()).into()),
            default_key_id: Arc::new(cfg.kms_key_id.clone()),
            dek_length: cfg.dek_length,
            app_name: Arc::new(cfg.app_name.clone()),
        }
    }
}

#[cfg(test)]
pub(crate) const TEST_API_KEY: &str = "test-api-key";

#[cfg(test)]
impl AppState {
    /// State around an arbitrary key-management backend, with cheap Argon2
    /// costs and [`TEST_API_KEY`].
    pub(crate) fn with_kms(kms: Arc<dyn KeyManagement>) -> Self {
        let cfg = crate::config::tests::valid_config();
        let hasher = crate::password::from_config(&cfg).expect("test Argon2 params are valid");
        Self::new(kms, hasher, &cfg)
    }
}

#[cfg(test)]
impl Default for AppState {
    /// Creates a state with an in-process registry holding `dev-master-key`,
    /// suitable for tests.
    fn default() -> Self {
        let cfg = crate::config::tests::valid_config();
        let kms = crate::kms::from_config(&cfg).expect("test registry builds");
        Self::with_kms(kms)
    }
}
