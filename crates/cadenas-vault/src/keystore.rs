//! Master-key lifecycle: generation, wrapping, and persistence.
//!
//! The 256-bit master key is created once, on first run, and persisted only
//! in wrapped form. Wrapping goes through the [`KeyProtector`] capability
//! trait so the backend stays interchangeable:
//!
//! - [`OsKeyProtector`] — a per-user wrapping secret held in the OS
//!   credential store (macOS Keychain, Windows Credential Manager, Secret
//!   Service); unwrap requires the same OS user that created it.
//! - [`PassphraseKeyProtector`] — Argon2id passphrase-derived wrapping key,
//!   for hosts without a usable native credential store.
//!
//! Key availability is tied to OS login (or the passphrase), which is the
//! accepted trust boundary for a single-user desktop vault.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cadenas_crypto_core::{random, symmetric, SecretBytes};
use zeroize::Zeroizing;

use crate::error::VaultError;
use crate::files;

/// Master key length in bytes (AES-256).
pub const MASTER_KEY_LEN: usize = 32;

/// Wrapped-key file name inside the vault data directory.
pub const KEY_FILE_NAME: &str = "master.key";

/// Salt length for the passphrase backend, in bytes.
const KDF_SALT_LEN: usize = 16;

// ── Capability trait ────────────────────────────────────────────────

/// User-scoped secret wrapping: protect bytes so only the same user and
/// machine context can unprotect them.
pub trait KeyProtector {
    /// Wrap raw key material into an opaque at-rest record.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::KeyUnavailable`] if the backing primitive
    /// cannot be reached, or a crypto error if sealing fails.
    fn protect(&self, key: &[u8]) -> Result<Vec<u8>, VaultError>;

    /// Unwrap a record produced by [`KeyProtector::protect`].
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::KeyUnavailable`] if the record is corrupt or
    /// was wrapped under a different user/machine context.
    fn unprotect(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, VaultError>;
}

// ── OS credential-store backend ─────────────────────────────────────

/// Wrapping backend backed by the OS credential store.
///
/// A 32-byte wrapping secret lives in the store under a fixed
/// service/account label, created on first use. Protect and unprotect are
/// AES-256-GCM under that secret, so the at-rest record stays a
/// self-contained blob while access control is delegated to the OS.
pub struct OsKeyProtector {
    service: String,
    account: String,
}

impl OsKeyProtector {
    /// Backend with the default CADENAS labels.
    #[must_use]
    pub fn new() -> Self {
        Self::with_labels("cadenas", "master-wrapping-key")
    }

    /// Backend with custom credential-store labels.
    #[must_use]
    pub fn with_labels(service: &str, account: &str) -> Self {
        Self {
            service: service.to_owned(),
            account: account.to_owned(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry, VaultError> {
        keyring::Entry::new(&self.service, &self.account)
            .map_err(|e| VaultError::KeyUnavailable(format!("credential store unavailable: {e}")))
    }

    /// Fetch the wrapping secret, creating it on first use when `create`
    /// is set.
    fn wrapping_secret(&self, create: bool) -> Result<Zeroizing<Vec<u8>>, VaultError> {
        let entry = self.entry()?;
        match entry.get_secret() {
            Ok(secret) => {
                let secret = Zeroizing::new(secret);
                if secret.len() == MASTER_KEY_LEN {
                    Ok(secret)
                } else {
                    Err(VaultError::KeyUnavailable(format!(
                        "stored wrapping secret is {} bytes",
                        secret.len()
                    )))
                }
            }
            Err(keyring::Error::NoEntry) if create => {
                let fresh = SecretBytes::<MASTER_KEY_LEN>::random().map_err(VaultError::from)?;
                entry.set_secret(fresh.expose()).map_err(|e| {
                    VaultError::KeyUnavailable(format!("cannot store wrapping secret: {e}"))
                })?;
                tracing::info!(service = %self.service, "created OS wrapping secret");
                Ok(Zeroizing::new(fresh.expose().to_vec()))
            }
            Err(keyring::Error::NoEntry) => Err(VaultError::KeyUnavailable(
                "no wrapping secret in the credential store for this user".into(),
            )),
            Err(e) => Err(VaultError::KeyUnavailable(format!(
                "credential store error: {e}"
            ))),
        }
    }
}

impl Default for OsKeyProtector {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyProtector for OsKeyProtector {
    fn protect(&self, key: &[u8]) -> Result<Vec<u8>, VaultError> {
        let secret = self.wrapping_secret(true)?;
        Ok(symmetric::encrypt(key, &secret)?)
    }

    fn unprotect(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, VaultError> {
        let secret = self.wrapping_secret(false)?;
        let plain = symmetric::decrypt(wrapped, &secret)
            .map_err(|e| VaultError::KeyUnavailable(format!("unwrap rejected: {e}")))?;
        Ok(Zeroizing::new(plain.expose().to_vec()))
    }
}

// ── Passphrase fallback backend ─────────────────────────────────────

/// Argon2id cost parameters for the passphrase backend.
///
/// Serializable so the hosting application can persist a calibrated cost
/// in its settings. Fields use the `argon2` crate convention (`m_cost` in
/// KiB).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argon2Cost {
    /// Memory cost in KiB.
    pub m_cost: u32,
    /// Iterations.
    pub t_cost: u32,
    /// Parallelism lanes.
    pub p_cost: u32,
}

impl Default for Argon2Cost {
    fn default() -> Self {
        // 64 MiB / 3 passes: interactive-unlock cost on desktop hardware.
        Self {
            m_cost: 65_536,
            t_cost: 3,
            p_cost: 1,
        }
    }
}

/// Wrapping backend deriving the wrapping key from a passphrase.
///
/// Record layout: `salt (16) || encrypted blob`. The salt is drawn fresh
/// per protect call.
pub struct PassphraseKeyProtector {
    passphrase: Zeroizing<Vec<u8>>,
    cost: Argon2Cost,
}

impl PassphraseKeyProtector {
    /// Backend with the default Argon2id cost.
    #[must_use]
    pub fn new(passphrase: &str) -> Self {
        Self::with_cost(passphrase, Argon2Cost::default())
    }

    /// Backend with explicit Argon2id cost (tests use a reduced cost).
    #[must_use]
    pub fn with_cost(passphrase: &str, cost: Argon2Cost) -> Self {
        Self {
            passphrase: Zeroizing::new(passphrase.as_bytes().to_vec()),
            cost,
        }
    }

    fn derive_wrapping_key(&self, salt: &[u8]) -> Result<Zeroizing<[u8; MASTER_KEY_LEN]>, VaultError> {
        let params = argon2::Params::new(
            self.cost.m_cost,
            self.cost.t_cost,
            self.cost.p_cost,
            Some(MASTER_KEY_LEN),
        )
        .map_err(|e| VaultError::KeyUnavailable(format!("invalid argon2 params: {e}")))?;
        let argon2 = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

        let mut output = Zeroizing::new([0u8; MASTER_KEY_LEN]);
        argon2
            .hash_password_into(&self.passphrase, salt, &mut *output)
            .map_err(|e| VaultError::KeyUnavailable(format!("argon2id derivation failed: {e}")))?;
        Ok(output)
    }
}

impl KeyProtector for PassphraseKeyProtector {
    fn protect(&self, key: &[u8]) -> Result<Vec<u8>, VaultError> {
        let salt: [u8; KDF_SALT_LEN] = random::random_array().map_err(VaultError::from)?;
        let wrapping = self.derive_wrapping_key(&salt)?;
        let blob = symmetric::encrypt(key, &*wrapping)?;

        let mut out = Vec::with_capacity(KDF_SALT_LEN.saturating_add(blob.len()));
        out.extend_from_slice(&salt);
        out.extend_from_slice(&blob);
        Ok(out)
    }

    fn unprotect(&self, wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, VaultError> {
        if wrapped.len() <= KDF_SALT_LEN {
            return Err(VaultError::KeyUnavailable(format!(
                "wrapped record too short: {} bytes",
                wrapped.len()
            )));
        }
        let (salt, blob) = wrapped.split_at(KDF_SALT_LEN);
        let wrapping = self.derive_wrapping_key(salt)?;
        let plain = symmetric::decrypt(blob, &*wrapping)
            .map_err(|e| VaultError::KeyUnavailable(format!("unwrap rejected: {e}")))?;
        Ok(Zeroizing::new(plain.expose().to_vec()))
    }
}

// ── Keystore ────────────────────────────────────────────────────────

/// Wrapped master-key file lifecycle over a [`KeyProtector`] backend.
///
/// Paths and backend are explicit constructor state — no module-level
/// globals — so tests get deterministic, isolated keystores.
pub struct Keystore<P> {
    path: PathBuf,
    protector: P,
}

impl<P: KeyProtector> Keystore<P> {
    /// Keystore rooted at `data_dir`, using [`KEY_FILE_NAME`].
    #[must_use]
    pub fn new(data_dir: &Path, protector: P) -> Self {
        Self {
            path: data_dir.join(KEY_FILE_NAME),
            protector,
        }
    }

    /// Location of the wrapped-key file.
    #[must_use]
    pub fn key_path(&self) -> &Path {
        &self.path
    }

    /// Create and persist a wrapped master key if none exists yet.
    /// Idempotent — safe to call on every startup.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::KeyUnavailable`] if wrapping fails, or an I/O
    /// error if the record cannot be written.
    pub fn ensure_key(&self) -> Result<(), VaultError> {
        if self.path.exists() {
            tracing::debug!(path = %self.path.display(), "wrapped master key already present");
            return Ok(());
        }

        let fresh = SecretBytes::<MASTER_KEY_LEN>::random().map_err(VaultError::from)?;
        let wrapped = self.protector.protect(fresh.expose())?;
        files::write_atomic(&self.path, &wrapped)?;
        tracing::info!(path = %self.path.display(), "created wrapped master key");
        Ok(())
    }

    /// Read and unwrap the master key.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::KeyUnavailable`] if the file is missing or
    /// the backend rejects the record (corrupt, or wrapped under another
    /// user/machine context). Other filesystem failures propagate as
    /// [`VaultError::Io`].
    pub fn load_key(&self) -> Result<SecretBytes<MASTER_KEY_LEN>, VaultError> {
        let wrapped = fs::read(&self.path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                VaultError::KeyUnavailable("wrapped key file missing".into())
            } else {
                VaultError::Io(e)
            }
        })?;

        let raw = self.protector.unprotect(&wrapped)?;
        if raw.len() != MASTER_KEY_LEN {
            return Err(VaultError::KeyUnavailable(format!(
                "unwrapped key is {} bytes (expected {MASTER_KEY_LEN})",
                raw.len()
            )));
        }

        let mut key = [0u8; MASTER_KEY_LEN];
        key.copy_from_slice(&raw);
        tracing::debug!("master key unwrapped");
        Ok(SecretBytes::new(key))
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Reduced Argon2id cost so key wrapping stays fast under test.
    const TEST_COST: Argon2Cost = Argon2Cost {
        m_cost: 1024,
        t_cost: 1,
        p_cost: 1,
    };

    fn test_protector() -> PassphraseKeyProtector {
        PassphraseKeyProtector::with_cost("correct horse battery", TEST_COST)
    }

    #[test]
    fn passphrase_protect_unprotect_roundtrip() {
        let protector = test_protector();
        let wrapped = protector.protect(&[0x5A; 32]).expect("protect should succeed");
        let raw = protector.unprotect(&wrapped).expect("unprotect should succeed");
        assert_eq!(raw.as_slice(), &[0x5A; 32]);
    }

    #[test]
    fn wrong_passphrase_cannot_unwrap() {
        let wrapped = test_protector().protect(&[0x5A; 32]).expect("protect should succeed");
        let wrong = PassphraseKeyProtector::with_cost("wrong passphrase", TEST_COST);
        assert!(matches!(
            wrong.unprotect(&wrapped),
            Err(VaultError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn truncated_record_is_rejected() {
        let protector = test_protector();
        assert!(matches!(
            protector.unprotect(&[0u8; KDF_SALT_LEN]),
            Err(VaultError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn protect_uses_fresh_salt_per_call() {
        let protector = test_protector();
        let a = protector.protect(&[0x5A; 32]).expect("protect should succeed");
        let b = protector.protect(&[0x5A; 32]).expect("protect should succeed");
        assert_ne!(a[..KDF_SALT_LEN], b[..KDF_SALT_LEN]);
    }

    #[test]
    fn argon2_cost_serde_roundtrip() {
        let cost = Argon2Cost::default();
        let json = serde_json::to_string(&cost).expect("serialize");
        let restored: Argon2Cost = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(cost, restored);
    }

    #[test]
    fn ensure_key_creates_file_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let keystore = Keystore::new(dir.path(), test_protector());

        keystore.ensure_key().expect("ensure should succeed");
        assert!(keystore.key_path().exists());
        let first = fs::read(keystore.key_path()).expect("read");

        // Second call is a no-op: the wrapped record is untouched.
        keystore.ensure_key().expect("ensure should be idempotent");
        let second = fs::read(keystore.key_path()).expect("read");
        assert_eq!(first, second);
    }

    #[test]
    fn ensure_then_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let keystore = Keystore::new(dir.path(), test_protector());
        keystore.ensure_key().expect("ensure should succeed");

        let a = keystore.load_key().expect("load should succeed");
        let b = keystore.load_key().expect("load should succeed");
        assert_eq!(a.expose(), b.expose(), "loads must yield the same key");
    }

    #[test]
    fn load_without_file_is_key_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let keystore = Keystore::new(dir.path(), test_protector());
        assert!(matches!(
            keystore.load_key(),
            Err(VaultError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn corrupted_record_is_key_unavailable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let keystore = Keystore::new(dir.path(), test_protector());
        keystore.ensure_key().expect("ensure should succeed");

        let mut wrapped = fs::read(keystore.key_path()).expect("read");
        let last = wrapped.len() - 1;
        wrapped[last] ^= 0xFF;
        fs::write(keystore.key_path(), &wrapped).expect("write");

        assert!(matches!(
            keystore.load_key(),
            Err(VaultError::KeyUnavailable(_))
        ));
    }

    #[test]
    fn no_tmp_file_left_after_ensure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let keystore = Keystore::new(dir.path(), test_protector());
        keystore.ensure_key().expect("ensure should succeed");
        assert!(!dir.path().join(".master.key.tmp").exists());
    }
}
