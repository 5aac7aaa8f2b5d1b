//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - AES-256-GCM authenticated encryption (`aead`)
//! - Argon2id password-based key derivation (`kdf`)
//! - HKDF-based sub-key derivation and the password verifier (`keys`)

pub mod aead;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{derive_master_key, MasterKey, ...};
pub use aead::{SealedPayload, NONCE_LEN, TAG_LEN};
pub use kdf::{derive_master_key, generate_salt, Argon2Params, KEY_LEN, SALT_LEN};
pub use keys::{MasterKey, VERIFIER_LEN};
