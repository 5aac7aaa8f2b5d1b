//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  Parameters are configurable via `Argon2Params`
//! (defaults, or `PASSVAULT_KDF_*` environment overrides for tests) and
//! are written into the vault header so re-opening always uses the exact
//! settings the vault was created with.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::TryRngCore;

use crate::errors::{Result, VaultError};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
///
/// Stored in the vault header at creation so the same cost settings are
/// applied on every subsequent open.  Raising the cost for an existing
/// vault means re-deriving with the stored params and re-encrypting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// Resolve parameters from the environment, falling back to defaults.
    ///
    /// Recognized variables: `PASSVAULT_KDF_MEMORY_KIB`,
    /// `PASSVAULT_KDF_ITERATIONS`, `PASSVAULT_KDF_PARALLELISM`.
    /// Intended for tests that cannot afford the full work factor;
    /// the minimum-cost floor still applies.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            memory_kib: env_u32("PASSVAULT_KDF_MEMORY_KIB").unwrap_or(defaults.memory_kib),
            iterations: env_u32("PASSVAULT_KDF_ITERATIONS").unwrap_or(defaults.iterations),
            parallelism: env_u32("PASSVAULT_KDF_PARALLELISM").unwrap_or(defaults.parallelism),
        }
    }
}

fn env_u32(name: &str) -> Option<u32> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Derive a 32-byte master key from a password and salt using Argon2id.
///
/// The same password + salt + params will always produce the same key.
/// Enforces minimum parameters to prevent dangerously weak KDF settings.
///
/// Deliberately slow (hundreds of milliseconds at default cost) — call
/// it off any latency-sensitive thread.
pub fn derive_master_key(
    password: &[u8],
    salt: &[u8],
    params: &Argon2Params,
) -> Result<[u8; KEY_LEN]> {
    if params.memory_kib < MIN_MEMORY_KIB {
        return Err(VaultError::KeyDerivationFailed(format!(
            "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
            params.memory_kib
        )));
    }
    if params.iterations < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 iterations must be at least 1".into(),
        ));
    }
    if params.parallelism < 1 {
        return Err(VaultError::KeyDerivationFailed(
            "Argon2 parallelism must be at least 1".into(),
        ));
    }

    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| VaultError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng
        .try_fill_bytes(&mut salt)
        .expect("OS RNG unavailable");
    salt
}
