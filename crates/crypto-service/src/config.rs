//! Configuration loading and validation for the crypto service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::crypto::aead::VALID_KEY_LENGTHS;
use crate::password::hasher::{MAX_SALT_LEN, MIN_SALT_LEN};

/// Validated crypto service configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Service name reported by `/` and `/health`.
    #[serde(default = "default_app_name")]
    pub app_name: String,

    /// Shared secret every `/crypto/*` caller must send in `X-API-Key`. **Required.**
    pub api_key: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Key-management backend. Only `"mock"` (in-process registry) exists.
    #[serde(default = "default_kms_provider")]
    pub kms_provider: String,

    /// Id of the master key created at startup and used when a wrap/unwrap
    /// request names none.
    #[serde(default = "default_kms_key_id")]
    pub kms_key_id: String,

    /// Base64-encoded 32-byte key material for `kms_key_id`. When unset an
    /// ephemeral key is generated and wrapped keys do not survive a restart.
    #[serde(default)]
    pub master_key: Option<String>,

    /// DEK length in bytes used when `/crypto/generate-dek` names none.
    #[serde(default = "default_dek_length")]
    pub dek_length: usize,

    /// Argon2 iteration count.
    #[serde(default = "default_argon2_time_cost")]
    pub argon2_time_cost: u32,

    /// Argon2 memory cost in KiB.
    #[serde(default = "default_argon2_memory_cost")]
    pub argon2_memory_cost: u32,

    /// Argon2 lanes.
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// Argon2 output length in bytes.
    #[serde(default = "default_argon2_hash_len")]
    pub argon2_hash_len: usize,

    /// Argon2 salt length in bytes.
    #[serde(default = "default_argon2_salt_len")]
    pub argon2_salt_len: usize,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// OTLP gRPC endpoint for span export. Spans are only exported when set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_app_name() -> String {
    "Crypto Service".into()
}
fn default_listen_port() -> u16 {
    8000
}
fn default_kms_provider() -> String {
    "mock".into()
}
fn default_kms_key_id() -> String {
    "dev-master-key".into()
}
fn default_dek_length() -> usize {
    32
}
fn default_argon2_time_cost() -> u32 {
    2
}
fn default_argon2_memory_cost() -> u32 {
    65536
}
fn default_argon2_parallelism() -> u32 {
    4
}
fn default_argon2_hash_len() -> usize {
    32
}
fn default_argon2_salt_len() -> usize {
    16
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.api_key, "API_KEY")?;
        ensure_non_empty(&self.app_name, "APP_NAME")?;
        ensure_non_empty(&self.kms_key_id, "KMS_KEY_ID")?;

        if self.kms_provider != "mock" {
            anyhow::bail!(
                "KMS_PROVIDER {:?} is not supported; only \"mock\" is available",
                self.kms_provider
            );
        }
        if !VALID_KEY_LENGTHS.contains(&self.dek_length) {
            anyhow::bail!("DEK_LENGTH must be 16, 24, or 32");
        }
        if self.argon2_time_cost == 0 {
            anyhow::bail!("ARGON2_TIME_COST must be > 0");
        }
        if self.argon2_parallelism == 0 {
            anyhow::bail!("ARGON2_PARALLELISM must be > 0");
        }
        if u64::from(self.argon2_memory_cost) < 8 * u64::from(self.argon2_parallelism) {
            anyhow::bail!("ARGON2_MEMORY_COST must be at least 8 KiB per lane");
        }
        if self.argon2_hash_len < 4 {
            anyhow::bail!("ARGON2_HASH_LEN must be >= 4");
        }
        if !(MIN_SALT_LEN..=MAX_SALT_LEN).contains(&self.argon2_salt_len) {
            anyhow::bail!("ARGON2_SALT_LEN must be between {MIN_SALT_LEN} and {MAX_SALT_LEN}");
        }
        Ok(())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("app_name", &self.app_name)
            .field("api_key", &"[REDACTED]")
            .field("listen_port", &self.listen_port)
            .field("kms_provider", &self.kms_provider)
            .field("kms_key_id", &self.kms_key_id)
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .field("dek_length", &self.dek_length)
            .field("argon2_time_cost", &self.argon2_time_cost)
            .field("argon2_memory_cost", &self.argon2_memory_cost)
            .field("argon2_parallelism", &self.argon2_parallelism)
            .field("argon2_hash_len", &self.argon2_hash_len)
            .field("argon2_salt_len", &self.argon2_salt_len)
            .field("log_level", &self.log_level)
            .field("otel_exporter_otlp_endpoint", &self.otel_exporter_otlp_endpoint)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
