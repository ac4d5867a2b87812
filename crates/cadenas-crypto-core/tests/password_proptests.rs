#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for entropy-targeted password generation.

use std::collections::HashSet;

use cadenas_crypto_core::password::{
    effective_length, generate, DIGITS, LOWERCASE, SYMBOLS, UPPERCASE,
};
use proptest::prelude::*;

fn full_alphabet() -> HashSet<u8> {
    [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS]
        .concat()
        .into_iter()
        .collect()
}

proptest! {
    /// Generated length is exactly the larger of the preferred minimum and
    /// the entropy-derived minimum.
    #[test]
    fn length_is_max_of_minimums(
        target_bits in 1u32..=512,
        preferred_min in 1usize..=64,
    ) {
        let pw = generate(target_bits, preferred_min).expect("generate should succeed");
        prop_assert_eq!(pw.len(), effective_length(target_bits, preferred_min));
    }

    /// Every output character belongs to the fixed four-class alphabet.
    #[test]
    fn output_stays_within_alphabet(
        target_bits in 1u32..=256,
        preferred_min in 1usize..=64,
    ) {
        let alphabet = full_alphabet();
        let pw = generate(target_bits, preferred_min).expect("generate should succeed");
        prop_assert!(pw.bytes().all(|b| alphabet.contains(&b)));
    }

    /// Any password of four or more characters covers all four classes.
    #[test]
    fn class_coverage_holds(
        target_bits in 1u32..=256,
        preferred_min in 4usize..=64,
    ) {
        let pw = generate(target_bits, preferred_min).expect("generate should succeed");
        prop_assert!(pw.bytes().any(|b| UPPERCASE.contains(&b)), "no uppercase");
        prop_assert!(pw.bytes().any(|b| LOWERCASE.contains(&b)), "no lowercase");
        prop_assert!(pw.bytes().any(|b| DIGITS.contains(&b)), "no digit");
        prop_assert!(pw.bytes().any(|b| SYMBOLS.contains(&b)), "no symbol");
    }
}
