//! AES-GCM authenticated encryption with optional associated data.
//!
//! The key length selects the variant: 16 bytes → AES-128-GCM, 24 → AES-192-GCM,
//! 32 → AES-256-GCM. Nonces are 96 bits and tags 128 bits for every variant.
//!
//! The underlying primitive returns `ciphertext || tag` as one buffer. This
//! module splits the tag off on encryption and recombines it on decryption, so
//! callers always handle the tag as a separate value.
//!
//! **Never reuse a nonce with the same key.** GCM nonce reuse leaks the XOR of
//! the plaintexts and lets an attacker forge tags. [`encrypt`] draws a fresh
//! nonce from the OS CSPRNG whenever the caller does not supply one.

use aes::Aes192;
use aes_gcm::{
    aead::{consts::U12, rand_core::RngCore, Aead, KeyInit, OsRng, Payload},
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
};
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-192 in GCM mode with a 96-bit nonce. `aes-gcm` only aliases the 128 and
/// 256-bit variants.
type Aes192Gcm = AesGcm<Aes192, U12>;

/// Byte length of a GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of a GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Accepted symmetric key lengths in bytes (AES-128, AES-192, AES-256).
pub const VALID_KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// Errors produced by the AEAD layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AeadError {
    /// A key, nonce or tag has the wrong length.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The tag did not verify against (key, nonce, ciphertext, aad).
    #[error("authentication failed")]
    AuthenticationFailure,

    /// The primitive rejected an encryption request (e.g. plaintext exceeds
    /// the GCM length limit) or returned a buffer shorter than a tag.
    #[error("aead operation failed")]
    AeadFailure,
}

/// Raw symmetric key material of a valid AES length.
///
/// The bytes are zeroed on drop and never printed by `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey(Vec<u8>);

impl SymmetricKey {
    /// Copy `bytes` into a new key after checking the length.
    ///
    /// # Errors
    ///
    /// Returns [`AeadError::InvalidParameter`] unless `bytes.len()` is 16, 24 or 32.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AeadError> {
        ensure_key_len(bytes.len())?;
        Ok(Self(bytes.to_vec()))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Name of the AEAD algorithm this key selects, e.g. `"AES-256-GCM"`.
    pub fn algorithm(&self) -> &'static str {
        // The length was validated on construction.
        algorithm_for_key_len(self.0.len()).unwrap_or("AES-GCM")
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key bytes are never printed.
        write!(f, "SymmetricKey({} bytes, [REDACTED])", self.0.len())
    }
}

/// Output of [`encrypt`]: ciphertext, the nonce used, and the detached tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    /// Encrypted bytes, same length as the plaintext.
    pub ciphertext: Vec<u8>,
    /// Nonce the payload was encrypted under.
    pub nonce: [u8; NONCE_LEN],
    /// GCM authentication tag.
    pub tag: [u8; TAG_LEN],
}

/// Map a key length to its algorithm name.
///
/// Returns `None` for lengths outside [`VALID_KEY_LENGTHS`].
pub fn algorithm_for_key_len(len: usize) -> Option<&'static str> {
    match len {
        16 => Some("AES-128-GCM"),
        24 => Some("AES-192-GCM"),
        32 => Some("AES-256-GCM"),
        _ => None,
    }
}

/// Generate a random symmetric key of `length` bytes from the OS CSPRNG.
///
/// # Errors
///
/// Returns [`AeadError::InvalidParameter`] if `length` is not 16, 24 or 32.
pub fn generate_key(length: usize) -> Result<SymmetricKey, AeadError> {
    ensure_key_len(length)?;
    let mut key = SymmetricKey(vec![0u8; length]);
    OsRng.fill_bytes(&mut key.0);
    Ok(key)
}

/// Generate `length` random bytes for use as a nonce.
///
/// No validation is applied; AES-GCM callers should pass [`NONCE_LEN`].
pub fn generate_nonce(length: usize) -> Vec<u8> {
    let mut nonce = vec![0u8; length];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext` under `key`, binding the optional `aad`.
///
/// If `nonce` is `None` a fresh random nonce is generated. A caller-supplied
/// nonce must be exactly [`NONCE_LEN`] bytes and must never have been used
/// with this key before.
///
/// # Errors
///
/// Returns [`AeadError::InvalidParameter`] if the key or supplied nonce has the
/// wrong length. Returns [`AeadError::AeadFailure`] if the primitive fails.
pub fn encrypt(
    key: &[u8],
    plaintext: &[u8],
    aad: Option<&[u8]>,
    nonce: Option<&[u8]>,
) -> Result<SealedPayload, AeadError> {
    let cipher = Cipher::new(key)?;

    let nonce = match nonce {
        Some(n) => to_nonce(n)?,
        None => {
            let mut n = [0u8; NONCE_LEN];
            OsRng.fill_bytes(&mut n);
            n
        }
    };

    let payload = Payload {
        msg: plaintext,
        aad: aad.unwrap_or_default(),
    };
    let mut combined = cipher
        .encrypt(Nonce::<U12>::from_slice(&nonce), payload)
        .map_err(|_| AeadError::AeadFailure)?;

    if combined.len() < TAG_LEN {
        return Err(AeadError::AeadFailure);
    }
    let tag_bytes = combined.split_off(combined.len() - TAG_LEN);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&tag_bytes);

    Ok(SealedPayload {
        ciphertext: combined,
        nonce,
        tag,
    })
}

/// Verify and decrypt `ciphertext` under `key`.
///
/// The ciphertext and tag are recombined before the primitive runs. No
/// plaintext is returned unless the tag verifies.
///
/// # Errors
///
/// Returns [`AeadError::InvalidParameter`] if the key, nonce or tag has the
/// wrong length. Returns [`AeadError::AuthenticationFailure`] if the tag does
/// not verify (wrong key, tampered data, or mismatched AAD).
pub fn decrypt(
    key: &[u8],
    ciphertext: &[u8],
    nonce: &[u8],
    tag: &[u8],
    aad: Option<&[u8]>,
) -> Result<Vec<u8>, AeadError> {
    let cipher = Cipher::new(key)?;
    let nonce = to_nonce(nonce)?;
    if tag.len() != TAG_LEN {
        return Err(AeadError::InvalidParameter(format!(
            "tag must be {TAG_LEN} bytes, got {}",
            tag.len()
        )));
    }

    let mut combined = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    combined.extend_from_slice(ciphertext);
    combined.extend_from_slice(tag);

    let payload = Payload {
        msg: &combined,
        aad: aad.unwrap_or_default(),
    };
    cipher
        .decrypt(Nonce::<U12>::from_slice(&nonce), payload)
        .map_err(|_| AeadError::AuthenticationFailure)
}

fn ensure_key_len(len: usize) -> Result<(), AeadError> {
    if VALID_KEY_LENGTHS.contains(&len) {
        Ok(())
    } else {
        Err(AeadError::InvalidParameter(format!(
            "key length must be 16, 24, or 32 bytes, got {len}"
        )))
    }
}

fn to_nonce(bytes: &[u8]) -> Result<[u8; NONCE_LEN], AeadError> {
    bytes.try_into().map_err(|_| {
        AeadError::InvalidParameter(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            bytes.len()
        ))
    })
}

/// AES-GCM instance keyed for one operation.
enum Cipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl Cipher {
    fn new(key: &[u8]) -> Result<Self, AeadError> {
        ensure_key_len(key.len())?;
        let cipher = match key.len() {
            16 => Aes128Gcm::new_from_slice(key).map(Cipher::Aes128),
            24 => Aes192Gcm::new_from_slice(key).map(Cipher::Aes192),
            _ => Aes256Gcm::new_from_slice(key).map(Cipher::Aes256),
        };
        cipher.map_err(|_| {
            AeadError::InvalidParameter(format!("invalid key length {}", key.len()))
        })
    }

    fn encrypt(
        &self,
        nonce: &Nonce<U12>,
        payload: Payload<'_, '_>,
    ) -> Result<Vec<u8>, aes_gcm::Error> {
        match self {
            Cipher::Aes128(c) => c.encrypt(nonce, payload),
            Cipher::Aes192(c) => c.encrypt(nonce, payload),
            Cipher::Aes256(c) => c.encrypt(nonce, payload),
        }
    }

    fn decrypt(
        &self,
        nonce: &Nonce<U12>,
        payload: Payload<'_, '_>,
    ) -> Result<Vec<u8>, aes_gcm::Error> {
        match self {
            Cipher::Aes128(c) => c.decrypt(nonce, payload),
            Cipher::Aes192(c) => c.decrypt(nonce, payload),
            Cipher::Aes256(c) => c.decrypt(nonce, payload),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }

    #[test]
    fn generate_key_valid_lengths() {
        for len in VALID_KEY_LENGTHS {
            let a = generate_key(len).unwrap();
            let b = generate_key(len).unwrap();
            assert_eq!(a.as_bytes().len(), len);
            assert_ne!(a.as_bytes(), b.as_bytes(), "two keys of length {len} collided");
        }
    }

    #[test]
    fn generate_key_rejects_invalid_lengths() {
        for len in [0, 1, 15, 17, 31, 33, 64] {
            assert!(matches!(
                generate_key(len),
                Err(AeadError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn generate_nonce_honours_length() {
        assert_eq!(generate_nonce(NONCE_LEN).len(), NONCE_LEN);
        assert_eq!(generate_nonce(24).len(), 24);
        assert_ne!(generate_nonce(NONCE_LEN), generate_nonce(NONCE_LEN));
    }

    #[test]
    fn round_trip_all_key_sizes() {
        for len in VALID_KEY_LENGTHS {
            let key = generate_key(len).unwrap();
            for plaintext in [&b""[..], b"x", b"This is my secret data!", &[7u8; 4096][..]] {
                let sealed = encrypt(key.as_bytes(), plaintext, None, None).unwrap();
                assert_eq!(sealed.ciphertext.len(), plaintext.len());
                let opened = decrypt(
                    key.as_bytes(),
                    &sealed.ciphertext,
                    &sealed.nonce,
                    &sealed.tag,
                    None,
                )
                .unwrap();
                assert_eq!(opened, plaintext);
            }
        }
    }

    #[test]
    fn zero_key_hello_scenario() {
        let key = [0u8; 32];
        let sealed = encrypt(&key, b"hello", None, None).unwrap();
        assert_eq!(sealed.ciphertext.len(), 5);
        assert_eq!(sealed.tag.len(), TAG_LEN);

        let opened = decrypt(&key, &sealed.ciphertext, &sealed.nonce, &sealed.tag, None).unwrap();
        assert_eq!(opened, b"hello");

        let mut bad_tag = sealed.tag;
        bad_tag[TAG_LEN - 1] = bad_tag[TAG_LEN - 1].wrapping_add(1);
        assert_eq!(
            decrypt(&key, &sealed.ciphertext, &sealed.nonce, &bad_tag, None),
            Err(AeadError::AuthenticationFailure)
        );
    }

    #[test]
    fn known_answer_vectors() {
        // NIST GCM test cases 1 (AES-128) and 13 (AES-256): zero key, zero IV, empty plaintext.
        let nonce = [0u8; NONCE_LEN];
        let sealed = encrypt(&[0u8; 16], b"", None, Some(&nonce)).unwrap();
        assert_eq!(sealed.tag.to_vec(), hex("58e2fccefa7e3061367f1d57a4e7455a"));

        let sealed = encrypt(&[0u8; 32], b"", None, Some(&nonce)).unwrap();
        assert_eq!(sealed.tag.to_vec(), hex("530f8afbc74536b9a963b4f1c4cb738b"));
    }

    #[test]
    fn supplied_nonce_is_used() {
        let key = generate_key(32).unwrap();
        let nonce = generate_nonce(NONCE_LEN);
        let sealed = encrypt(key.as_bytes(), b"payload", None, Some(&nonce)).unwrap();
        assert_eq!(sealed.nonce.to_vec(), nonce);
    }

    #[test]
    fn generated_nonces_differ_per_call() {
        let key = generate_key(32).unwrap();
        let a = encrypt(key.as_bytes(), b"same", None, None).unwrap();
        let b = encrypt(key.as_bytes(), b"same", None, None).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn flipping_any_bit_fails_authentication() {
        let key = generate_key(32).unwrap();
        let k = key.as_bytes();
        let sealed = encrypt(k, b"hello", Some(b"ctx"), None).unwrap();

        for i in 0..sealed.ciphertext.len() * 8 {
            let mut ct = sealed.ciphertext.clone();
            ct[i / 8] ^= 1 << (i % 8);
            assert_eq!(
                decrypt(k, &ct, &sealed.nonce, &sealed.tag, Some(b"ctx")),
                Err(AeadError::AuthenticationFailure)
            );
        }
        for i in 0..NONCE_LEN * 8 {
            let mut nonce = sealed.nonce;
            nonce[i / 8] ^= 1 << (i % 8);
            assert_eq!(
                decrypt(k, &sealed.ciphertext, &nonce, &sealed.tag, Some(b"ctx")),
                Err(AeadError::AuthenticationFailure)
            );
        }
        for i in 0..TAG_LEN * 8 {
            let mut tag = sealed.tag;
            tag[i / 8] ^= 1 << (i % 8);
            assert_eq!(
                decrypt(k, &sealed.ciphertext, &sealed.nonce, &tag, Some(b"ctx")),
                Err(AeadError::AuthenticationFailure)
            );
        }
    }

    #[test]
    fn aad_is_bound() {
        let key = generate_key(24).unwrap();
        let k = key.as_bytes();
        let sealed = encrypt(k, b"secret", Some(b"tenant-a"), None).unwrap();

        assert_eq!(
            decrypt(k, &sealed.ciphertext, &sealed.nonce, &sealed.tag, Some(b"tenant-a")).unwrap(),
            b"secret"
        );
        assert_eq!(
            decrypt(k, &sealed.ciphertext, &sealed.nonce, &sealed.tag, Some(b"tenant-b")),
            Err(AeadError::AuthenticationFailure)
        );
        assert_eq!(
            decrypt(k, &sealed.ciphertext, &sealed.nonce, &sealed.tag, None),
            Err(AeadError::AuthenticationFailure)
        );
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let k1 = generate_key(32).unwrap();
        let k2 = generate_key(32).unwrap();
        let sealed = encrypt(k1.as_bytes(), b"secret", None, None).unwrap();
        assert_eq!(
            decrypt(k2.as_bytes(), &sealed.ciphertext, &sealed.nonce, &sealed.tag, None),
            Err(AeadError::AuthenticationFailure)
        );
    }

    #[test]
    fn invalid_lengths_are_parameter_errors() {
        let key = [0u8; 32];
        assert!(matches!(
            encrypt(&[0u8; 20], b"x", None, None),
            Err(AeadError::InvalidParameter(_))
        ));
        assert!(matches!(
            encrypt(&key, b"x", None, Some(&[0u8; 8])),
            Err(AeadError::InvalidParameter(_))
        ));

        let sealed = encrypt(&key, b"x", None, None).unwrap();
        assert!(matches!(
            decrypt(&[0u8; 31], &sealed.ciphertext, &sealed.nonce, &sealed.tag, None),
            Err(AeadError::InvalidParameter(_))
        ));
        assert!(matches!(
            decrypt(&key, &sealed.ciphertext, &sealed.nonce[..11], &sealed.tag, None),
            Err(AeadError::InvalidParameter(_))
        ));
        assert!(matches!(
            decrypt(&key, &sealed.ciphertext, &sealed.nonce, &sealed.tag[..15], None),
            Err(AeadError::InvalidParameter(_))
        ));
    }

    #[test]
    fn symmetric_key_debug_is_redacted() {
        let key = SymmetricKey::from_bytes(&[0xAB; 16]).unwrap();
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("171"));
        assert_eq!(key.algorithm(), "AES-128-GCM");
    }

    #[test]
    fn algorithm_names() {
        assert_eq!(algorithm_for_key_len(16), Some("AES-128-GCM"));
        assert_eq!(algorithm_for_key_len(24), Some("AES-192-GCM"));
        assert_eq!(algorithm_for_key_len(32), Some("AES-256-GCM"));
        assert_eq!(algorithm_for_key_len(8), None);
    }
}
