//! `cadenas-crypto-core` — Pure cryptographic primitives for CADENAS.
//!
//! This crate is the audit target: zero I/O, zero network, zero async.
//! It covers the vault's entire cryptographic surface — authenticated
//! encryption of stored secrets, PIN hashing, entropy-targeted password
//! generation, display filtering, and the CSPRNG plumbing under all of it.
//! Key and PIN persistence live in `cadenas-vault`.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod display;
pub mod error;
pub mod memory;
pub mod password;
pub mod pin;
pub mod random;
pub mod symmetric;

pub use display::{build_display, MASK_GLYPH, MAX_DISPLAY_LEN};
pub use error::CryptoError;
pub use memory::{disable_core_dumps, SecretBuffer, SecretBytes};
pub use password::{effective_length, generate, ALPHABET_LEN};
pub use pin::PinRecord;
pub use symmetric::{decrypt, encrypt, EncryptedBlob, KEY_LEN, MIN_BLOB_LEN, NONCE_LEN, TAG_LEN};
