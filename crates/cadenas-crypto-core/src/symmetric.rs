//! AES-256-GCM authenticated encryption of vault secrets.
//!
//! This module provides:
//! - [`encrypt`] / [`decrypt`] — wire-level operations on the
//!   `nonce || ciphertext || tag` blob stored by the vault
//! - [`EncryptedBlob`] — structured nonce + ciphertext + tag container
//!
//! The zero-length blob is the canonical encoding of empty plaintext:
//! [`encrypt`] of empty input yields an empty vec and [`decrypt`] of an
//! empty blob yields an empty buffer, neither is an error. Every non-empty
//! encryption draws a fresh random 96-bit nonce; nonce uniqueness rests on
//! the negligible collision probability of independent 96-bit draws rather
//! than on counter state.

use ring::aead;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::memory::SecretBuffer;
use crate::random;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Minimum valid non-empty blob: nonce + empty ciphertext + tag.
pub const MIN_BLOB_LEN: usize = NONCE_LEN + TAG_LEN;

// ── Types ───────────────────────────────────────────────────────────

/// Authenticated ciphertext container.
///
/// Wire format: `nonce (12) || ciphertext (= plaintext length) || tag (16)`.
/// The tag authenticates the nonce and ciphertext; flipping any bit of the
/// serialized form makes decryption fail.
#[must_use = "encrypted data must be stored or transmitted"]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// 96-bit random nonce, unique per encryption.
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext, same length as the original plaintext (no padding).
    pub ciphertext: Vec<u8>,
    /// 128-bit authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl EncryptedBlob {
    /// Serialize to the wire format `nonce || ciphertext || tag`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let capacity = NONCE_LEN
            .saturating_add(self.ciphertext.len())
            .saturating_add(TAG_LEN);
        let mut out = Vec::with_capacity(capacity);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Parse the wire format by fixed offsets.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedBlob`] if the input is shorter than
    /// the 28-byte envelope.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_BLOB_LEN {
            return Err(CryptoError::MalformedBlob {
                actual: bytes.len(),
                minimum: MIN_BLOB_LEN,
            });
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);

        // The length guard above makes this subtraction infallible; the
        // checked form satisfies the arithmetic_side_effects deny lint.
        let ct_end = bytes
            .len()
            .checked_sub(TAG_LEN)
            .ok_or(CryptoError::MalformedBlob {
                actual: bytes.len(),
                minimum: MIN_BLOB_LEN,
            })?;
        let ciphertext = bytes[NONCE_LEN..ct_end].to_vec();

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[ct_end..]);

        Ok(Self {
            nonce,
            ciphertext,
            tag,
        })
    }
}

// ── Key handling ────────────────────────────────────────────────────

fn gcm_key(key: &[u8]) -> Result<aead::LessSafeKey, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeyMaterial(format!(
            "key is {} bytes (expected {KEY_LEN})",
            key.len()
        )));
    }
    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| CryptoError::InvalidKeyMaterial("AES-256-GCM key rejected".into()))?;
    Ok(aead::LessSafeKey::new(unbound))
}

// ── Structured operations ───────────────────────────────────────────

/// Encrypt plaintext under `key` with a fresh random nonce.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyMaterial`] if the key is not 32 bytes,
/// [`CryptoError::SecureMemory`] if the nonce draw fails, or
/// [`CryptoError::Encryption`] if the seal itself fails.
pub fn seal(plaintext: &[u8], key: &[u8]) -> Result<EncryptedBlob, CryptoError> {
    let gcm = gcm_key(key)?;

    let nonce_bytes: [u8; NONCE_LEN] = random::random_array()?;
    let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

    // Encrypt in place — the plaintext copy becomes the ciphertext.
    let mut in_out = plaintext.to_vec();
    let Ok(tag) = gcm.seal_in_place_separate_tag(nonce, aead::Aad::empty(), &mut in_out) else {
        in_out.zeroize();
        return Err(CryptoError::Encryption("AES-256-GCM seal failed".into()));
    };

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_ref());

    Ok(EncryptedBlob {
        nonce: nonce_bytes,
        ciphertext: in_out,
        tag: tag_bytes,
    })
}

/// Decrypt and authenticate an [`EncryptedBlob`].
///
/// # Errors
///
/// Returns [`CryptoError::InvalidKeyMaterial`] if the key is not 32 bytes,
/// or [`CryptoError::AuthenticationFailed`] if the tag does not verify
/// (tampered ciphertext, wrong key, or corrupted nonce). No plaintext is
/// returned on failure.
pub fn open(blob: &EncryptedBlob, key: &[u8]) -> Result<SecretBuffer, CryptoError> {
    let gcm = gcm_key(key)?;
    let nonce = aead::Nonce::assume_unique_for_key(blob.nonce);

    let mut ct_tag = Vec::with_capacity(blob.ciphertext.len().saturating_add(TAG_LEN));
    ct_tag.extend_from_slice(&blob.ciphertext);
    ct_tag.extend_from_slice(&blob.tag);

    let plaintext = gcm
        .open_in_place(nonce, aead::Aad::empty(), &mut ct_tag)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    let result = SecretBuffer::new(plaintext)?;
    ct_tag.zeroize();
    Ok(result)
}

// ── Wire-level operations ───────────────────────────────────────────

/// Encrypt a secret field for persistence.
///
/// Empty plaintext encodes as the empty blob — callers persist a
/// zero-length value, not a 28-byte envelope around nothing.
///
/// # Errors
///
/// Same as [`seal`].
pub fn encrypt(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if plaintext.is_empty() {
        return Ok(Vec::new());
    }
    Ok(seal(plaintext, key)?.to_bytes())
}

/// Decrypt a persisted secret field.
///
/// The empty blob decodes to an empty buffer, never to an error.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedBlob`] for a non-empty blob shorter
/// than 28 bytes, otherwise the same errors as [`open`].
pub fn decrypt(blob: &[u8], key: &[u8]) -> Result<SecretBuffer, CryptoError> {
    if blob.is_empty() {
        return SecretBuffer::new(&[]);
    }
    open(&EncryptedBlob::from_bytes(blob)?, key)
}

// ── Tests ───────────────────────────────────────────────────────────
