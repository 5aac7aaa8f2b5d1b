//! AES-256-GCM authenticated encryption.
//!
//! Each call to `seal` generates a fresh random 12-byte nonce, so the
//! same key never reuses one.  The nonce travels alongside the
//! ciphertext in `SealedPayload`; the vault file stores the two as
//! separate fields.  AES-GCM appends its 16-byte authentication tag to
//! the ciphertext.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{Result, VaultError};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the authentication tag appended to the ciphertext.
pub const TAG_LEN: usize = 16;

/// A nonce + ciphertext pair produced by `seal`.
///
/// The ciphertext includes the trailing 16-byte auth tag.
#[derive(Debug, Clone)]
pub struct SealedPayload {
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` with a 32-byte `key` under a fresh random nonce.
pub fn seal(key: &[u8], plaintext: &[u8]) -> Result<SealedPayload> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    Ok(SealedPayload {
        nonce: nonce.into(),
        ciphertext,
    })
}

/// Decrypt a payload produced by `seal`.
///
/// Fails closed: a ciphertext too short to carry a tag is `Corrupt`;
/// any authentication failure is `Tampered`.  No partial plaintext is
/// ever returned.
pub fn open(key: &[u8], payload: &SealedPayload) -> Result<Vec<u8>> {
    if payload.ciphertext.len() < TAG_LEN {
        return Err(VaultError::Corrupt(
            "ciphertext too short to carry an auth tag".into(),
        ));
    }

    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| VaultError::Tampered)?;
    let nonce = Nonce::from_slice(&payload.nonce);

    cipher
        .decrypt(nonce, payload.ciphertext.as_slice())
        .map_err(|_| VaultError::Tampered)
}
