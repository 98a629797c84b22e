//! Argon2id password hashing with PHC-format output.

use argon2::{
    password_hash::{
        self,
        rand_core::{OsRng, RngCore},
        PasswordHash, PasswordHasher as _, PasswordVerifier as _, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Shortest salt accepted, in bytes.
pub const MIN_SALT_LEN: usize = 8;

/// Longest salt that fits a PHC salt string, in bytes.
pub const MAX_SALT_LEN: usize = 48;

/// Errors produced by the password hashing layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    /// Empty password or invalid Argon2 parameters.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The stored hash is not a parseable Argon2 PHC string.
    #[error("Invalid hash format")]
    InvalidHash,

    /// The Argon2 computation itself failed.
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

/// Outcome of [`Argon2Hasher::verify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    pub valid: bool,
    /// `true` when the hash was produced with parameters other than the
    /// current configuration and should be replaced on next login.
    pub needs_rehash: bool,
}

/// Argon2id hasher bound to one set of cost parameters.
#[derive(Debug, Clone)]
pub struct Argon2Hasher {
    params: Params,
    salt_len: usize,
}

impl Argon2Hasher {
    /// Build a hasher from raw cost parameters.
    ///
    /// `memory_cost` is in KiB.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::InvalidParameter`] if Argon2 rejects the
    /// parameters or `salt_len` is outside `MIN_SALT_LEN..=MAX_SALT_LEN`.
    pub fn new(
        time_cost: u32,
        memory_cost: u32,
        parallelism: u32,
        hash_len: usize,
        salt_len: usize,
    ) -> Result<Self, PasswordError> {
        if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&salt_len) {
            return Err(PasswordError::InvalidParameter(format!(
                "salt length must be {MIN_SALT_LEN}..={MAX_SALT_LEN} bytes, got {salt_len}"
            )));
        }
        let params = Params::new(memory_cost, time_cost, parallelism, Some(hash_len))
            .map_err(|e| PasswordError::InvalidParameter(e.to_string()))?;
        Ok(Self { params, salt_len })
    }

    /// Hash `password` with a fresh random salt.
    ///
    /// Returns a PHC string such as `$argon2id$v=19$m=65536,t=2,p=4$<salt>$<hash>`.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::InvalidParameter`] for an empty password.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::InvalidParameter(
                "Password cannot be empty".into(),
            ));
        }

        let mut salt_bytes = vec![0u8; self.salt_len];
        OsRng.fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check `password` against a stored PHC hash.
    ///
    /// A mismatch is not an error: it yields `valid = false`.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::InvalidHash`] if `hash` cannot be parsed or
    /// was not produced by Argon2.
    pub fn verify(&self, hash: &str, password: &str) -> Result<Verification, PasswordError> {
        let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(Verification {
                valid: true,
                needs_rehash: self.needs_rehash(&parsed),
            }),
            Err(password_hash::Error::Password) => Ok(Verification {
                valid: false,
                needs_rehash: false,
            }),
            Err(_) => Err(PasswordError::InvalidHash),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn needs_rehash(&self, hash: &PasswordHash<'_>) -> bool {
        if hash.algorithm != Algorithm::Argon2id.ident() {
            return true;
        }
        if hash.version != Some(u32::from(Version::V0x13)) {
            return true;
        }
        let salt_len = hash.salt.and_then(|salt| {
            let mut buf = [0u8; 64];
            salt.decode_b64(&mut buf).ok().map(|decoded| decoded.len())
        });
        if salt_len != Some(self.salt_len) {
            return true;
        }
        match Params::try_from(hash) {
            Ok(stored) => {
                stored.m_cost() != self.params.m_cost()
                    || stored.t_cost() != self.params.t_cost()
                    || stored.p_cost() != self.params.p_cost()
                    || stored.output_len() != self.params.output_len()
            }
            Err(_) => true,
        }
    }
}
