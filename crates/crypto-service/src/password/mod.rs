//! Argon2id password hashing.
//!
//! Independent of the envelope-encryption core: no imports from `crate::crypto`
//! or `crate::kms`. The hash string embeds salt and cost parameters, so a
//! hash produced under older settings still verifies and is flagged with
//! `needs_rehash`.

pub mod hasher;

pub use hasher::{Argon2Hasher, PasswordError};

use anyhow::{Context, Result};

use crate::config::Config;

/// Build an [`Argon2Hasher`] from the `ARGON2_*` configuration values.
///
/// # Errors
///
/// Returns an error if Argon2 rejects the configured parameters.
pub fn from_config(cfg: &Config) -> Result<Argon2Hasher> {
    Argon2Hasher::new(
        cfg.argon2_time_cost,
        cfg.argon2_memory_cost,
        cfg.argon2_parallelism,
        cfg.argon2_hash_len,
        cfg.argon2_salt_len,
    )
    .context("invalid Argon2 configuration")
}
