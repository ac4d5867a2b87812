//! Entropy-targeted password generation.
//!
//! Passwords are drawn from four fixed disjoint character classes, each
//! pre-filtered to drop the visually ambiguous glyphs `0 O 1 l I`. Length
//! is sized from a target entropy: with the 83-glyph alphabet a 128-bit
//! target needs 21 characters and a 256-bit target needs 41.
//!
//! Every draw routes through [`crate::random`], so bounded choices are
//! rejection-sampled and the final Fisher–Yates shuffle removes the
//! positional bias introduced by seeding one character per class.

use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::random;

// Character classes, ambiguous glyphs removed.
/// Uppercase letters, minus `I` and `O` (24 glyphs).
pub const UPPERCASE: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
/// Lowercase letters, minus `l` (25 glyphs).
pub const LOWERCASE: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
/// Digits, minus `0` and `1` (8 glyphs).
pub const DIGITS: &[u8] = b"23456789";
/// Punctuation and symbols (26 glyphs).
pub const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{};:,.<>?/";

/// Total alphabet size across the four classes.
pub const ALPHABET_LEN: usize = UPPERCASE.len() + LOWERCASE.len() + DIGITS.len() + SYMBOLS.len();

/// Minimum length at which one character from every class is guaranteed.
const CLASS_COVERAGE_MIN_LEN: usize = 4;

/// Length needed to reach `target_bits` of entropy over the full alphabet:
/// `ceil(target_bits / log2(ALPHABET_LEN))`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[allow(clippy::cast_precision_loss)]
pub fn length_for_bits(target_bits: u32) -> usize {
    let bits_per_char = (ALPHABET_LEN as f64).log2();
    (f64::from(target_bits) / bits_per_char).ceil() as usize
}

/// Effective password length: the larger of the caller's preferred
/// minimum and the entropy-derived minimum.
#[must_use]
pub fn effective_length(target_bits: u32, preferred_min_len: usize) -> usize {
    preferred_min_len.max(length_for_bits(target_bits))
}

/// Generate a password carrying at least `target_bits` of entropy.
///
/// If the effective length is at least 4, the output is guaranteed to
/// contain one character from each of the four classes; the remaining
/// positions are independent uniform draws from the full alphabet, and the
/// whole buffer is shuffled before returning.
///
/// The result is wrapped in [`Zeroizing`] so the plaintext is erased once
/// the caller is done with it.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidParameter`] if either argument is zero.
pub fn generate(
    target_bits: u32,
    preferred_min_len: usize,
) -> Result<Zeroizing<String>, CryptoError> {
    if target_bits == 0 {
        return Err(CryptoError::InvalidParameter(
            "target entropy must be positive".into(),
        ));
    }
    if preferred_min_len == 0 {
        return Err(CryptoError::InvalidParameter(
            "preferred minimum length must be positive".into(),
        ));
    }

    let final_len = effective_length(target_bits, preferred_min_len);

    let mut pool: Vec<u8> = Vec::with_capacity(ALPHABET_LEN);
    pool.extend_from_slice(UPPERCASE);
    pool.extend_from_slice(LOWERCASE);
    pool.extend_from_slice(DIGITS);
    pool.extend_from_slice(SYMBOLS);

    let mut chars: Vec<u8> = Vec::with_capacity(final_len);

    // Seed one character per class so short-but-valid passwords still
    // cover all four; the shuffle below removes the positional bias.
    if final_len >= CLASS_COVERAGE_MIN_LEN {
        for class in [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS] {
            chars.push(random::pick(class));
        }
    }

    for _ in chars.len()..final_len {
        chars.push(random::pick(&pool));
    }

    random::shuffle(&mut chars);

    // All classes are ASCII, so the bytes are valid UTF-8.
    Ok(Zeroizing::new(
        String::from_utf8(chars).expect("password bytes are ASCII"),
    ))
}

// ── Tests ───────────────────────────────────────────────────────────
