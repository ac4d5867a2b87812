//! Uniform CSPRNG draws — bytes, bounded integers, and shuffling.
//!
//! Every other module routes its randomness through here so the uniformity
//! requirements live in one place. Bounded draws use rand's `Uniform`
//! distribution, which rejection-samples so each outcome in `[0, n)` is
//! exactly equally likely — a plain modulo reduction would bias low values.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::error::CryptoError;

/// Fill `dest` with cryptographically secure random bytes.
///
/// # Errors
///
/// Returns [`CryptoError::SecureMemory`] if the OS CSPRNG fails.
pub fn fill(dest: &mut [u8]) -> Result<(), CryptoError> {
    OsRng
        .try_fill_bytes(dest)
        .map_err(|e| CryptoError::SecureMemory(format!("CSPRNG fill failed: {e}")))
}

/// Return a fresh random fixed-size byte array.
///
/// # Errors
///
/// Returns [`CryptoError::SecureMemory`] if the OS CSPRNG fails.
pub fn random_array<const N: usize>() -> Result<[u8; N], CryptoError> {
    let mut bytes = [0u8; N];
    fill(&mut bytes)?;
    Ok(bytes)
}

/// Uniform integer in `[0, n)`, free of modulo bias.
///
/// # Panics
///
/// Panics if `n == 0` — an empty range has no valid outcome.
#[must_use]
pub fn below(n: usize) -> usize {
    OsRng.gen_range(0..n)
}

/// Uniform element choice from a non-empty slice.
///
/// # Panics
///
/// Panics if `items` is empty.
#[must_use]
pub fn pick<T: Copy>(items: &[T]) -> T {
    items[below(items.len())]
}

/// Uniform in-place Fisher–Yates shuffle.
pub fn shuffle<T>(items: &mut [T]) {
    items.shuffle(&mut OsRng);
}
