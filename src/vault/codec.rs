//! Sealing and unsealing the entry collection.
//!
//! The plaintext is the JSON serialization of the ordered `Vec<Entry>`,
//! so insertion order survives every round trip.  Sealing derives the
//! payload data key from the master key, encrypts under a fresh nonce,
//! and zeroizes both the sub-key and the plaintext buffer before
//! returning.

use zeroize::Zeroize;

use crate::crypto::aead::{self, SealedPayload};
use crate::crypto::keys::MasterKey;
use crate::errors::{Result, VaultError};

use super::entry::Entry;

/// Serialize and encrypt the entry collection.
///
/// A fresh random nonce is generated for every call — the same key
/// never seals twice under one nonce.
pub fn encode_entries(key: &MasterKey, entries: &[Entry]) -> Result<SealedPayload> {
    let mut plaintext = serde_json::to_vec(entries)
        .map_err(|e| VaultError::EncryptionFailed(format!("entry serialization: {e}")))?;

    let mut data_key = key.derive_data_key()?;
    let sealed = aead::seal(&data_key, &plaintext);
    data_key.zeroize();
    plaintext.zeroize();

    sealed
}

/// Decrypt and deserialize the entry collection.
///
/// Fails closed: an authentication failure is `Tampered`, a structural
/// failure after successful decryption is `Corrupt`.  Partial data is
/// never returned.
pub fn decode_entries(key: &MasterKey, payload: &SealedPayload) -> Result<Vec<Entry>> {
    let mut data_key = key.derive_data_key()?;
    let plaintext = aead::open(&data_key, payload);
    data_key.zeroize();

    let mut plaintext = plaintext?;
    let entries = serde_json::from_slice(&plaintext)
        .map_err(|e| VaultError::Corrupt(format!("entry payload: {e}")));
    plaintext.zeroize();

    entries
}
