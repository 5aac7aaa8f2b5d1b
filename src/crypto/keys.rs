//! Master key wrapper and HKDF-SHA256 sub-key derivation.
//!
//! From the single Argon2id-derived master key we derive two independent
//! sub-keys:
//! - A **data key** that encrypts the vault payload.
//! - A **verifier key** that authenticates a fixed context string,
//!   producing the password verifier stored in the vault header.
//!
//! Domain separation through HKDF `info` strings means the stored
//! verifier reveals nothing about the key that protects the payload.

use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::errors::{Result, VaultError};

/// Length of derived sub-keys (256 bits).
const KEY_LEN: usize = 32;

/// Length of the password verifier stored in the header (256 bits).
pub const VERIFIER_LEN: usize = 32;

/// Fixed context string the verifier key authenticates.
const VERIFIER_CONTEXT: &[u8] = b"passvault-verifier-v1";

/// HKDF info string for the payload encryption key.
const DATA_KEY_INFO: &[u8] = b"passvault-data-key";

/// HKDF info string for the verifier key.
const VERIFIER_KEY_INFO: &[u8] = b"passvault-verifier-key";

/// Internal helper: run HKDF-SHA256 expand with the given `info`.
///
/// The `extract` step is skipped — the master key is already uniform
/// (it came from Argon2id), so it serves directly as the PRK.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A wrapper around the 32-byte master key that automatically zeroes
/// its memory when dropped.
///
/// The key lives exactly as long as the unlocked session that owns it.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Create a new `MasterKey` from raw bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Derive the payload encryption key.
    pub fn derive_data_key(&self) -> Result<[u8; KEY_LEN]> {
        hkdf_derive(&self.bytes, DATA_KEY_INFO)
    }

    /// Compute the password verifier: HMAC-SHA256 of a fixed context
    /// under the verifier sub-key.
    ///
    /// The result is stored unencrypted in the vault header so an open
    /// can test password correctness without touching the ciphertext.
    pub fn make_verifier(&self) -> Result<[u8; VERIFIER_LEN]> {
        let mut verifier_key = hkdf_derive(&self.bytes, VERIFIER_KEY_INFO)?;

        let mut mac = Hmac::<Sha256>::new_from_slice(&verifier_key)
            .map_err(|e| VaultError::KeyDerivationFailed(format!("HMAC init failed: {e}")))?;
        mac.update(VERIFIER_CONTEXT);

        verifier_key.zeroize();

        Ok(mac.finalize().into_bytes().into())
    }

    /// Check a stored verifier against this key in constant time.
    ///
    /// Uses `subtle::ConstantTimeEq` — latency does not depend on how
    /// many bytes match, so a wrong password leaks nothing through
    /// timing.
    pub fn check_verifier(&self, stored: &[u8]) -> Result<bool> {
        let computed = self.make_verifier()?;
        Ok(computed[..].ct_eq(stored).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_key_differs_from_verifier() {
        let mk = MasterKey::new([0x42u8; 32]);
        let data_key = mk.derive_data_key().unwrap();
        let verifier = mk.make_verifier().unwrap();
        assert_ne!(data_key, verifier);
    }

    #[test]
    fn verifier_is_deterministic() {
        let mk = MasterKey::new([0x17u8; 32]);
        assert_eq!(mk.make_verifier().unwrap(), mk.make_verifier().unwrap());
    }

    #[test]
    fn check_verifier_accepts_own_output() {
        let mk = MasterKey::new([0x01u8; 32]);
        let verifier = mk.make_verifier().unwrap();
        assert!(mk.check_verifier(&verifier).unwrap());
    }

    #[test]
    fn check_verifier_rejects_other_key() {
        let mk = MasterKey::new([0x01u8; 32]);
        let other = MasterKey::new([0x02u8; 32]);
        let verifier = other.make_verifier().unwrap();
        assert!(!mk.check_verifier(&verifier).unwrap());
    }

    #[test]
    fn check_verifier_rejects_wrong_length() {
        let mk = MasterKey::new([0x01u8; 32]);
        assert!(!mk.check_verifier(&[0u8; 16]).unwrap());
    }
}
