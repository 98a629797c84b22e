//! AES-GCM payload encryption primitives.
//!
//! This module is intentionally free of HTTP and key-registry dependencies.
//! It provides the key/nonce generation and encrypt/decrypt operations used by
//! both the `/crypto/encrypt` handlers and the master-key registry.
//!
//! # Outputs
//!
//! [`aead::encrypt`] returns the ciphertext, the nonce and the 16-byte tag as
//! three separate values. They are never concatenated here; callers store or
//! transmit each one and pass all three back to [`aead::decrypt`].

pub mod aead;

pub use aead::{AeadError, SymmetricKey};
