//! Display-string construction for generated passwords.
//!
//! The UI shows an adjusted view of a generated password: characters the
//! user excluded are dropped, the result can be truncated to a requested
//! length, and the whole thing can be masked. Scratch buffers holding real
//! password characters are zeroized before release so discarded plaintext
//! does not linger in memory.

use std::collections::HashSet;

use zeroize::Zeroizing;

/// Upper bound on the requested display length — the longest password the
/// generator produces at its highest entropy target (256 bits).
pub const MAX_DISPLAY_LEN: usize = 41;

/// Glyph used for masked display.
pub const MASK_GLYPH: char = '•';

/// Build the user-facing display string for `full`.
///
/// Steps, in order:
/// 1. Clamp `target_len` to `[0, MAX_DISPLAY_LEN]`.
/// 2. Empty `full` yields an empty result.
/// 3. Drop every character present in `excluded` (set membership, not
///    pattern matching).
/// 4. Truncate to `target_len` when it is positive and shorter than the
///    filtered text.
/// 5. With `mask` set, return `target_len` repetitions of [`MASK_GLYPH`]
///    instead of real characters. Masked output is sized to the requested
///    target, not the true filtered length, so it reveals nothing about
///    how many characters survived filtering.
#[must_use]
pub fn build_display(
    full: &str,
    excluded: &HashSet<char>,
    target_len: usize,
    mask: bool,
) -> Zeroizing<String> {
    let target_len = target_len.min(MAX_DISPLAY_LEN);

    if full.is_empty() {
        return Zeroizing::new(String::new());
    }

    let mut filtered = Zeroizing::new(String::with_capacity(full.len()));
    for c in full.chars() {
        if !excluded.contains(&c) {
            filtered.push(c);
        }
    }

    if target_len > 0 && filtered.chars().count() > target_len {
        let mut truncated = Zeroizing::new(String::with_capacity(target_len));
        for c in filtered.chars().take(target_len) {
            truncated.push(c);
        }
        filtered = truncated;
    }

    if mask {
        // `filtered` zeroizes on drop here; no real character escapes.
        return Zeroizing::new(MASK_GLYPH.to_string().repeat(target_len));
    }

    filtered
}

// ── Tests ───────────────────────────────────────────────────────────
