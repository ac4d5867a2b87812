//! PIN record persistence and session lockout.
//!
//! The PIN gate stands in front of the vault: it is checked before any
//! vault data is touched and is independent of the encryption path. PIN
//! protection is opt-in — no record on disk means open access.
//!
//! State machine: `NoPinSet ⇄ PinSet` via [`PinGate::set_pin`] /
//! [`PinGate::remove_pin`]; verification never changes state.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cadenas_crypto_core::PinRecord;

use crate::error::VaultError;
use crate::files;

/// PIN record file name inside the vault data directory.
pub const PIN_FILE_NAME: &str = "access.pin";

// ── PinGate ─────────────────────────────────────────────────────────

/// On-disk PIN record lifecycle.
///
/// The record is a single UTF-8 line `base64(salt):base64(hash)` with no
/// trailing metadata. Exactly one record exists at a time (single local
/// user); writes are atomic.
pub struct PinGate {
    path: PathBuf,
}

impl PinGate {
    /// Gate rooted at `data_dir`, using [`PIN_FILE_NAME`].
    #[must_use]
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(PIN_FILE_NAME),
        }
    }

    /// Location of the PIN record file.
    #[must_use]
    pub fn pin_path(&self) -> &Path {
        &self.path
    }

    /// Whether a PIN record exists.
    #[must_use]
    pub fn has_pin(&self) -> bool {
        self.path.exists()
    }

    /// Register a PIN, overwriting any prior record.
    ///
    /// # Errors
    ///
    /// Returns [`cadenas_crypto_core::CryptoError::InvalidPinFormat`]
    /// (wrapped) unless the trimmed input is exactly 4 characters, or an
    /// I/O error if the record cannot be written.
    pub fn set_pin(&self, pin: &str) -> Result<(), VaultError> {
        let record = PinRecord::derive(pin)?;
        files::write_atomic(&self.path, record.encode().as_bytes())?;
        tracing::info!("PIN registered");
        Ok(())
    }

    /// Check `pin` against the stored record.
    ///
    /// Returns `Ok(true)` unconditionally when no record exists, and
    /// `Ok(false)` when the stored record does not parse — a mangled
    /// record locks nobody out of fixing it via [`PinGate::remove_pin`],
    /// but it never verifies.
    ///
    /// # Errors
    ///
    /// Propagates filesystem failures other than absence; callers fail
    /// closed on those.
    pub fn verify_pin(&self, pin: &str) -> Result<bool, VaultError> {
        let line = match fs::read_to_string(&self.path) {
            Ok(line) => line,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(true),
            Err(e) => return Err(VaultError::Io(e)),
        };

        Ok(PinRecord::parse(&line).is_some_and(|record| record.verify(pin)))
    }

    /// Delete the PIN record if present; no-op otherwise.
    ///
    /// # Errors
    ///
    /// Propagates filesystem failures other than absence.
    pub fn remove_pin(&self) -> Result<(), VaultError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!("PIN removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::Io(e)),
        }
    }
}

// ── Lockout policy ──────────────────────────────────────────────────

/// Session attempt ceiling — a policy parameter, not a constant, so the
/// hosting application can tune max attempts (or swap hard exit for a
/// cooldown) without touching this layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockoutPolicy {
    /// Consecutive failures tolerated before lockout.
    pub max_attempts: u32,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

/// Session-scoped PIN verification with cumulative failure counting.
///
/// Failures accumulate across the session; reaching the ceiling yields
/// [`VaultError::LockedOut`] on that and every later attempt. A successful
/// verification resets the counter. The caller treats lockout as fatal for
/// the running process (or applies its own cooldown).
pub struct PinSession<'a> {
    gate: &'a PinGate,
    policy: LockoutPolicy,
    failures: u32,
}

impl<'a> PinSession<'a> {
    /// New session over `gate` with the given policy.
    #[must_use]
    pub const fn new(gate: &'a PinGate, policy: LockoutPolicy) -> Self {
        Self {
            gate,
            policy,
            failures: 0,
        }
    }

    /// Attempts left before lockout.
    #[must_use]
    pub const fn remaining_attempts(&self) -> u32 {
        self.policy.max_attempts.saturating_sub(self.failures)
    }

    /// Verify a PIN, counting failures toward the session ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::LockedOut`] once the ceiling is reached;
    /// otherwise the same errors as [`PinGate::verify_pin`].
    pub fn verify(&mut self, pin: &str) -> Result<bool, VaultError> {
        if self.failures >= self.policy.max_attempts {
            return Err(VaultError::LockedOut {
                attempts: self.failures,
            });
        }

        if self.gate.verify_pin(pin)? {
            self.failures = 0;
            return Ok(true);
        }

        self.failures = self.failures.saturating_add(1);
        tracing::warn!(
            failures = self.failures,
            remaining = self.remaining_attempts(),
            "PIN verification failed"
        );
        if self.failures >= self.policy.max_attempts {
            return Err(VaultError::LockedOut {
                attempts: self.failures,
            });
        }
        Ok(false)
    }
}

// ── Tests ───────────────────────────────────────────────────────────
