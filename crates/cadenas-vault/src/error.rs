//! Storage-layer error types for `cadenas-vault`.

use cadenas_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by key and PIN storage operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Cryptographic operation failed (delegated from the crypto core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Wrapped key file missing, corrupt, or unwrap rejected by the
    /// protection backend (wrong user or machine). Fatal to any
    /// encryption/decryption call; retrying cannot succeed without fixing
    /// the underlying record.
    #[error("master key unavailable: {0}")]
    KeyUnavailable(String),

    /// Filesystem failure on key or PIN file access. Callers fail closed:
    /// access is denied rather than proceeding without a key or PIN check.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The session's PIN attempt ceiling was reached. The caller decides
    /// between hard process exit and a cooldown.
    #[error("PIN locked out after {attempts} failed attempts")]
    LockedOut {
        /// Consecutive failures accumulated in this session.
        attempts: u32,
    },
}
