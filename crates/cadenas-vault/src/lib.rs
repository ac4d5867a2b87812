//! `cadenas-vault` — key and PIN storage layer for CADENAS.
//!
//! Sits between the pure crypto core and the hosting application:
//! - [`keystore`] — wrapped master-key lifecycle behind the
//!   [`KeyProtector`] capability trait
//! - [`pin_gate`] — PIN record persistence plus session lockout
//!
//! No operation here is safe to run concurrently with another against the
//! same key or PIN file; the caller serializes (one key/PIN operation in
//! flight at a time).

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
mod files;
pub mod keystore;
pub mod pin_gate;

pub use error::VaultError;
pub use keystore::{
    Argon2Cost, KeyProtector, Keystore, OsKeyProtector, PassphraseKeyProtector, KEY_FILE_NAME,
    MASTER_KEY_LEN,
};
pub use pin_gate::{LockoutPolicy, PinGate, PinSession, PIN_FILE_NAME};
