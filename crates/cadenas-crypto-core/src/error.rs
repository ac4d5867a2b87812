//! Cryptographic error types for `cadenas-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Symmetric encryption failure (AES-256-GCM seal).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag verification failed — ciphertext tampered, wrong
    /// key, or corrupted nonce. No plaintext is ever returned alongside this.
    #[error("decryption failed: authentication tag mismatch")]
    AuthenticationFailed,

    /// Encrypted blob shorter than the minimum 28-byte envelope.
    #[error("malformed encrypted blob: {actual} bytes (minimum {minimum})")]
    MalformedBlob {
        /// Length of the rejected blob.
        actual: usize,
        /// Minimum valid non-empty blob length.
        minimum: usize,
    },

    /// Invalid key material (wrong length, corrupted bytes).
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// PIN does not match the required format (4 characters after trimming).
    #[error("invalid PIN format: {0}")]
    InvalidPinFormat(String),

    /// Caller supplied a non-positive generator parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Secure memory allocation or CSPRNG failure.
    #[error("secure memory error: {0}")]
    SecureMemory(String),
}
