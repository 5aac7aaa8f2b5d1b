//! PassVault — a local-first encrypted credential vault engine.
//!
//! The vault is a single file holding an ordered collection of
//! `(title, secret value)` entries, encrypted at rest with AES-256-GCM
//! under a key derived from the master password via Argon2id.  The
//! password itself is never stored; opens are checked against a
//! constant-time verifier before any decryption is attempted.  Every
//! save is an atomic temp-file-then-rename.
//!
//! ```no_run
//! use passvault::{create_vault, open_vault};
//! use std::path::Path;
//!
//! # fn main() -> passvault::Result<()> {
//! let path = Path::new("my.vault");
//!
//! let mut session = create_vault(path, b"correct-horse")?;
//! session.add_entry("Gmail", "p@ss1")?;
//! session.persist()?;
//! session.lock();
//!
//! let session = open_vault(path, b"correct-horse")?;
//! for entry in session.list_entries()? {
//!     println!("{}", entry.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Key derivation is deliberately expensive (hundreds of milliseconds
//! at default cost) — run `create_vault`/`open_vault` off any
//! latency-sensitive thread.

pub mod auth;
pub mod crypto;
pub mod errors;
pub mod vault;

pub use auth::{AuthGate, UnlockToken};
pub use crypto::kdf::Argon2Params;
pub use errors::{Result, VaultError};
pub use vault::{Entry, VaultSession, VaultStore};

use std::path::Path;

/// Create a new vault at `path` and return its unlocked session.
///
/// Fails with `AlreadyExists` if the path is populated.  Shorthand for
/// `VaultStore::create` with default KDF parameters.
pub fn create_vault(path: &Path, password: &[u8]) -> Result<VaultSession> {
    VaultStore::create(path, password, None)
}

/// Open an existing vault at `path` with the master password.
///
/// Shorthand for `VaultStore::open`.
pub fn open_vault(path: &Path, password: &[u8]) -> Result<VaultSession> {
    VaultStore::open(path, password)
}
