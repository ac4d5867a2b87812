//! Local PIN hashing and constant-time verification.
//!
//! A [`PinRecord`] is a fresh 16-byte salt plus `SHA-256(salt || pin)`,
//! rendered on disk as one UTF-8 line `base64(salt):base64(hash)`.
//!
//! A single round of salted SHA-256 is a fast hash, not a deliberately slow
//! one. That is acceptable here because the threat model is a 4-digit PIN
//! behind the caller's lockout counter, not offline brute force of the
//! record file. Digit-only enforcement is a UI input mask, not a rule of
//! this layer.

use data_encoding::BASE64;
use ring::digest;
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::random;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// SHA-256 output length in bytes.
pub const HASH_LEN: usize = 32;

/// Required PIN length in characters, after trimming.
pub const PIN_LEN: usize = 4;

/// Constant-time byte comparison.
///
/// Returns `true` iff both slices have equal length and identical contents.
/// Bitwise OR accumulation avoids short-circuit timing leaks; the early
/// return on length mismatch is fine because both inputs here are always
/// 32-byte digests.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn pin_hash(salt: &[u8; SALT_LEN], pin: &str) -> [u8; HASH_LEN] {
    let mut ctx = digest::Context::new(&digest::SHA256);
    ctx.update(salt);
    ctx.update(pin.as_bytes());
    let mut hash = [0u8; HASH_LEN];
    hash.copy_from_slice(ctx.finish().as_ref());
    hash
}

/// Salted one-way hash of the local access PIN.
///
/// At most one record exists per vault; absence of the record means "no PIN
/// required". The plaintext PIN is never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct PinRecord {
    salt: [u8; SALT_LEN],
    hash: [u8; HASH_LEN],
}

impl PinRecord {
    /// Derive a new record from `pin` with a fresh random salt.
    ///
    /// The input is trimmed before validation and hashing, so surrounding
    /// whitespace from an input field does not change the PIN.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidPinFormat`] unless the trimmed input
    /// is exactly [`PIN_LEN`] characters, or [`CryptoError::SecureMemory`]
    /// if the salt draw fails.
    pub fn derive(pin: &str) -> Result<Self, CryptoError> {
        let trimmed = pin.trim();
        if trimmed.is_empty() || trimmed.chars().count() != PIN_LEN {
            return Err(CryptoError::InvalidPinFormat(format!(
                "PIN must be exactly {PIN_LEN} characters"
            )));
        }

        let salt: [u8; SALT_LEN] = random::random_array()?;
        let hash = pin_hash(&salt, trimmed);
        Ok(Self { salt, hash })
    }

    /// Check `pin` against this record in constant time.
    ///
    /// The candidate is trimmed the same way [`PinRecord::derive`] trims
    /// its input. The comparison runs over the full 32-byte digest
    /// regardless of where the first mismatch sits.
    #[must_use]
    pub fn verify(&self, pin: &str) -> bool {
        let mut candidate = pin_hash(&self.salt, pin.trim());
        let matched = constant_time_eq(&candidate, &self.hash);
        candidate.zeroize();
        matched
    }

    /// Render the on-disk form `base64(salt):base64(hash)`.
    #[must_use]
    pub fn encode(&self) -> String {
        format!("{}:{}", BASE64.encode(&self.salt), BASE64.encode(&self.hash))
    }

    /// Parse the on-disk form. Returns `None` for anything that is not two
    /// colon-separated base64 fields of the right decoded lengths — the
    /// caller treats an unparseable record as a failed verification.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.trim().splitn(2, ':');
        let salt_b64 = fields.next()?;
        let hash_b64 = fields.next()?;

        let salt_bytes = BASE64.decode(salt_b64.as_bytes()).ok()?;
        let hash_bytes = BASE64.decode(hash_b64.as_bytes()).ok()?;

        let salt: [u8; SALT_LEN] = salt_bytes.try_into().ok()?;
        let hash: [u8; HASH_LEN] = hash_bytes.try_into().ok()?;
        Some(Self { salt, hash })
    }
}

impl std::fmt::Debug for PinRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PinRecord(***)")
    }
}

// ── Tests ───────────────────────────────────────────────────────────
