#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests for the on-disk PIN gate.

use cadenas_vault::PinGate;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any 4-digit PIN survives the set→verify roundtrip through the
    /// record file, and a different PIN is rejected.
    #[test]
    fn set_verify_roundtrip(pin in "[0-9]{4}", other in "[0-9]{4}") {
        let dir = tempfile::tempdir().expect("tempdir");
        let gate = PinGate::new(dir.path());

        gate.set_pin(&pin).expect("set_pin should succeed");
        prop_assert!(gate.verify_pin(&pin).expect("verify should succeed"));
        if other != pin {
            prop_assert!(!gate.verify_pin(&other).expect("verify should succeed"));
        }
    }

    /// Arbitrary junk written over the record never verifies and never
    /// panics the gate.
    #[test]
    fn corrupt_record_never_verifies(junk in ".{0,64}", pin in "[0-9]{4}") {
        let dir = tempfile::tempdir().expect("tempdir");
        let gate = PinGate::new(dir.path());

        std::fs::write(gate.pin_path(), junk.as_bytes()).expect("write");
        // Either the junk happens to parse as a record (it will not match
        // this PIN's hash) or it fails parsing; both mean "false".
        prop_assert!(!gate.verify_pin(&pin).expect("verify should succeed"));
    }
}
