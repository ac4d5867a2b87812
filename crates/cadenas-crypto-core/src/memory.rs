//! Secure memory containers for key material and decrypted secrets.
//!
//! Both containers zero their contents on drop, best-effort `mlock` their
//! pages so secrets cannot be swapped to disk, and mask `Debug`/`Display`
//! output so keys never end up in logs by accident.

use std::fmt;

use secrecy::{ExposeSecret, SecretSlice};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::random;

// ── Page locking ────────────────────────────────────────────────────

/// RAII guard over an `mlock`'d region; `munlock`s on drop.
///
/// Locking is best-effort: if `mlock` fails (privileges, RLIMIT_MEMLOCK
/// quota), the secret still works, it just may be swapped.
struct MemLock {
    ptr: *const u8,
    len: usize,
    locked: bool,
}

// SAFETY: the pointer is only handed to mlock/munlock, which are
// thread-safe; the pointee is owned by the enclosing container.
unsafe impl Send for MemLock {}
unsafe impl Sync for MemLock {}

impl MemLock {
    fn acquire(ptr: *const u8, len: usize) -> Self {
        Self {
            ptr,
            len,
            locked: sys::mlock(ptr, len),
        }
    }

    const fn unlocked() -> Self {
        Self {
            ptr: std::ptr::null(),
            len: 0,
            locked: false,
        }
    }
}

impl Drop for MemLock {
    fn drop(&mut self) {
        if self.locked {
            sys::munlock(self.ptr, self.len);
        }
    }
}

// ── SecretBuffer — variable length ──────────────────────────────────

/// Variable-length container for sensitive bytes (decrypted plaintext).
///
/// Wraps [`SecretSlice<u8>`] from `secrecy`, which zeroizes on drop, and
/// adds page locking plus masked formatting.
pub struct SecretBuffer {
    inner: SecretSlice<u8>,
    _lock: MemLock,
}

impl SecretBuffer {
    /// Copy `data` into a new locked allocation. The caller should zeroize
    /// the source afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::SecureMemory`] if allocation fails.
    pub fn new(data: &[u8]) -> Result<Self, CryptoError> {
        let inner: SecretSlice<u8> = data.to_vec().into();
        let exposed = inner.expose_secret();
        let lock = MemLock::acquire(exposed.as_ptr(), exposed.len());
        Ok(Self { inner, _lock: lock })
    }

    /// Borrow the raw bytes for a cryptographic operation. Keep the
    /// exposure short-lived.
    #[must_use]
    pub fn expose(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    /// Number of bytes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Whether the buffer holds zero bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

impl fmt::Display for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretBuffer(***)")
    }
}

// ── SecretBytes<N> — fixed length ───────────────────────────────────

/// Fixed-size container for keys and salts. Zeroized on drop.
///
/// The master key lives in a `SecretBytes<32>` for exactly the duration of
/// the operation that needs it.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretBytes<const N: usize> {
    bytes: [u8; N],
    // The lock is managed by its own Drop, not by zeroize.
    #[zeroize(skip)]
    lock: MemLock,
}

impl<const N: usize> SecretBytes<N> {
    /// Take ownership of a fixed-size array (no copy remains with the
    /// caller).
    ///
    /// `mlock` pins the address the bytes occupy at construction; if the
    /// value is later moved, `munlock` on the stale address is a harmless
    /// no-op and zeroize-on-drop is unaffected.
    #[must_use]
    pub fn new(data: [u8; N]) -> Self {
        let mut s = Self {
            bytes: data,
            lock: MemLock::unlocked(),
        };
        s.lock = MemLock::acquire(s.bytes.as_ptr(), N);
        s
    }

    /// Fill a new container with CSPRNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::SecureMemory`] if the CSPRNG fails.
    pub fn random() -> Result<Self, CryptoError> {
        Ok(Self::new(random::random_array()?))
    }

    /// Borrow the raw bytes for a cryptographic operation.
    #[must_use]
    pub const fn expose(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> fmt::Debug for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

impl<const N: usize> fmt::Display for SecretBytes<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes<{N}>(***)")
    }
}

impl<const N: usize> From<[u8; N]> for SecretBytes<N> {
    fn from(data: [u8; N]) -> Self {
        Self::new(data)
    }
}

// ── Core dumps ──────────────────────────────────────────────────────

/// Disable core dumps for the current process (Unix: `RLIMIT_CORE` = 0;
/// elsewhere: no-op). Call once at startup before any key is unwrapped.
///
/// # Errors
///
/// Returns [`CryptoError::SecureMemory`] if the rlimit call fails.
pub fn disable_core_dumps() -> Result<(), CryptoError> {
    sys::disable_core_dumps()
}

// ── Platform shims ──────────────────────────────────────────────────

#[cfg(unix)]
mod sys {
    use crate::error::CryptoError;

    pub(super) fn mlock(ptr: *const u8, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        // SAFETY: mlock accepts any pointer/length pair; invalid regions
        // fail with ENOMEM, reported as an unlocked region.
        unsafe { libc::mlock(ptr.cast(), len) == 0 }
    }

    pub(super) fn munlock(ptr: *const u8, len: usize) {
        if len == 0 {
            return;
        }
        // SAFETY: munlock failure is non-critical.
        unsafe {
            libc::munlock(ptr.cast(), len);
        }
    }

    pub(super) fn disable_core_dumps() -> Result<(), CryptoError> {
        let limit = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: setrlimit with RLIMIT_CORE is a standard POSIX call.
        let ret = unsafe { libc::setrlimit(libc::RLIMIT_CORE, &raw const limit) };
        if ret == 0 {
            Ok(())
        } else {
            Err(CryptoError::SecureMemory(
                "failed to set RLIMIT_CORE to 0".into(),
            ))
        }
    }
}

#[cfg(not(unix))]
mod sys {
    use crate::error::CryptoError;

    pub(super) fn mlock(_ptr: *const u8, _len: usize) -> bool {
        false
    }

    pub(super) fn munlock(_ptr: *const u8, _len: usize) {}

    pub(super) fn disable_core_dumps() -> Result<(), CryptoError> {
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_buffer_holds_content() {
        let buf = SecretBuffer::new(b"key material").expect("allocation should succeed");
        assert_eq!(buf.expose(), b"key material");
        assert_eq!(buf.len(), 12);
        assert!(!buf.is_empty());
    }

    #[test]
    fn secret_buffer_empty() {
        let buf = SecretBuffer::new(b"").expect("allocation should succeed");
        assert!(buf.is_empty());
    }

    #[test]
    fn secret_buffer_debug_and_display_are_masked() {
        let buf = SecretBuffer::new(b"hunter2").expect("allocation should succeed");
        assert_eq!(format!("{buf:?}"), "SecretBuffer(***)");
        assert_eq!(format!("{buf}"), "SecretBuffer(***)");
    }

    #[test]
    fn secret_bytes_roundtrip() {
        let key = SecretBytes::new([0xAB; 32]);
        assert_eq!(key.expose(), &[0xAB; 32]);
    }

    #[test]
    fn secret_bytes_random_differ() {
        let a = SecretBytes::<32>::random().expect("random should succeed");
        let b = SecretBytes::<32>::random().expect("random should succeed");
        assert_ne!(a.expose(), b.expose());
    }

    #[test]
    fn secret_bytes_debug_is_masked() {
        let key = SecretBytes::<16>::new([0xFF; 16]);
        assert_eq!(format!("{key:?}"), "SecretBytes<16>(***)");
    }

    #[test]
    fn secret_bytes_from_array() {
        let key: SecretBytes<16> = [0x42; 16].into();
        assert_eq!(key.expose(), &[0x42; 16]);
    }

    #[cfg(unix)]
    #[test]
    fn disable_core_dumps_sets_rlimit() {
        disable_core_dumps().expect("disable_core_dumps should succeed");
        let mut limit = libc::rlimit {
            rlim_cur: 1,
            rlim_max: 1,
        };
        let ret = unsafe { libc::getrlimit(libc::RLIMIT_CORE, &raw mut limit) };
        assert_eq!(ret, 0);
        assert_eq!(limit.rlim_cur, 0);
    }
}
