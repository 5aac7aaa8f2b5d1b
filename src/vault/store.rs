//! Vault file ownership: create, open, save.
//!
//! `VaultStore` owns the on-disk file for one vault.  It enforces a
//! single open session per path — in-process through a registry of
//! canonicalized paths, cross-process through an advisory `.lock`
//! sibling file — and performs every save as an atomic
//! temp-file-then-rename so the file is never observed half-written.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use chrono::Utc;
use zeroize::Zeroize;

use crate::crypto::kdf::{derive_master_key, generate_salt, Argon2Params, SALT_LEN};
use crate::crypto::keys::{MasterKey, VERIFIER_LEN};
use crate::errors::{Result, VaultError};

use super::codec;
use super::entry::Entry;
use super::format::{self, StoredKdfParams, VaultHeader, CURRENT_VERSION};
use super::session::VaultSession;

// ---------------------------------------------------------------------------
// Single-writer-per-path enforcement
// ---------------------------------------------------------------------------

/// Canonicalized paths of every vault currently open in this process.
static OPEN_PATHS: OnceLock<Mutex<HashSet<PathBuf>>> = OnceLock::new();

fn open_paths() -> &'static Mutex<HashSet<PathBuf>> {
    OPEN_PATHS.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Exclusive claim on one vault path.
///
/// Held by the session for as long as it is unlocked; dropping it (on
/// lock or drop) releases both the in-process registration and the
/// advisory lock file, allowing the vault to be reopened.
pub(crate) struct PathGuard {
    canonical: PathBuf,
    lock_file: PathBuf,
}

impl PathGuard {
    /// Claim `path`, failing with `AlreadyOpen` if any session in this
    /// process — or, via the lock file, another process — holds it.
    fn acquire(path: &Path) -> Result<Self> {
        let canonical = canonical_vault_path(path)?;

        let mut open = open_paths().lock().unwrap_or_else(|e| e.into_inner());
        if !open.insert(canonical.clone()) {
            return Err(VaultError::AlreadyOpen(path.to_path_buf()));
        }

        // Advisory cross-process lock: creation must be exclusive.
        let lock_file = sibling_path(path, "lock");
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_file)
        {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                open.remove(&canonical);
                return Err(VaultError::AlreadyOpen(path.to_path_buf()));
            }
            Err(e) => {
                open.remove(&canonical);
                return Err(e.into());
            }
        }

        Ok(Self {
            canonical,
            lock_file,
        })
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_file);
        let mut open = open_paths().lock().unwrap_or_else(|e| e.into_inner());
        open.remove(&self.canonical);
    }
}

/// Canonical registry key for a vault path.
///
/// The vault file itself may not exist yet (create), so canonicalize
/// the parent directory and re-append the file name.
fn canonical_vault_path(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        VaultError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "vault path has no file name",
        ))
    })?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(parent.canonicalize()?.join(name))
}

/// A hidden sibling path: `dir/.<name>.<suffix>`.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.{suffix}",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

// ---------------------------------------------------------------------------
// VaultStore
// ---------------------------------------------------------------------------

/// Owns the on-disk file of one vault.
///
/// Lives inside the `VaultSession` it produced; sessions delegate
/// `persist` here.
pub struct VaultStore {
    path: PathBuf,
    header: VaultHeader,
}

impl VaultStore {
    /// Create a brand-new vault file at `path` and return its unlocked
    /// session.
    ///
    /// Generates a random salt, derives the master key from the
    /// password, and writes an empty vault to disk before returning.
    ///
    /// Pass `None` for `params` to use defaults (or the
    /// `PASSVAULT_KDF_*` environment overrides).
    pub fn create(
        path: &Path,
        password: &[u8],
        params: Option<&Argon2Params>,
    ) -> Result<VaultSession> {
        if path.exists() {
            return Err(VaultError::AlreadyExists(path.to_path_buf()));
        }

        let guard = PathGuard::acquire(path)?;

        // A racing create may have won between the existence check and
        // the path claim; re-check now that the claim is held.
        if path.exists() {
            return Err(VaultError::AlreadyExists(path.to_path_buf()));
        }

        // 1. Fresh salt, once per vault lifetime.
        let salt = generate_salt();

        // 2. Resolve KDF params (explicit, env override, or defaults).
        let effective = params.copied().unwrap_or_else(Argon2Params::from_env);

        // 3. Derive the master key.
        let mut master_bytes = derive_master_key(password, &salt, &effective)?;
        let master_key = MasterKey::new(master_bytes);
        master_bytes.zeroize();

        // 4. Build the header, verifier included.
        let header = VaultHeader {
            version: CURRENT_VERSION,
            kdf: StoredKdfParams {
                memory_kib: effective.memory_kib,
                iterations: effective.iterations,
                parallelism: effective.parallelism,
            },
            salt: salt.to_vec(),
            verifier: master_key.make_verifier()?.to_vec(),
            created_at: Utc::now(),
        };

        let store = Self {
            path: path.to_path_buf(),
            header,
        };

        // 5. Persist the empty vault before handing out the session.
        store.save(&master_key, &[])?;

        Ok(VaultSession::new(store, guard, master_key, Vec::new()))
    }

    /// Open an existing vault file and return its unlocked session.
    ///
    /// Reads the envelope, derives the master key from the password and
    /// the stored salt + params, checks the verifier in constant time
    /// (failing `WrongPassword` without touching the ciphertext), and
    /// only then decrypts the payload.
    pub fn open(path: &Path, password: &[u8]) -> Result<VaultSession> {
        let guard = PathGuard::acquire(path)?;

        // 1. Read and structurally validate the envelope.
        let raw = format::read_vault(path)?;

        if raw.header.salt.len() != SALT_LEN {
            return Err(VaultError::UnsupportedFormat(format!(
                "salt must be {SALT_LEN} bytes, got {}",
                raw.header.salt.len()
            )));
        }
        if raw.header.verifier.len() != VERIFIER_LEN {
            return Err(VaultError::UnsupportedFormat(format!(
                "verifier must be {VERIFIER_LEN} bytes, got {}",
                raw.header.verifier.len()
            )));
        }

        // 2. Derive the master key with the stored cost settings.
        let params = Argon2Params {
            memory_kib: raw.header.kdf.memory_kib,
            iterations: raw.header.kdf.iterations,
            parallelism: raw.header.kdf.parallelism,
        };
        let mut master_bytes = derive_master_key(password, &raw.header.salt, &params)?;
        let master_key = MasterKey::new(master_bytes);
        master_bytes.zeroize();

        // 3. Password check — before any decryption attempt.
        if !master_key.check_verifier(&raw.header.verifier)? {
            return Err(VaultError::WrongPassword);
        }

        // 4. Decrypt and deserialize the entry collection.
        let entries = codec::decode_entries(&master_key, &raw.payload)?;

        let store = Self {
            path: path.to_path_buf(),
            header: raw.header,
        };

        Ok(VaultSession::new(store, guard, master_key, entries))
    }

    /// Seal the entry collection and write the vault file atomically.
    ///
    /// The original file survives any failure; a fresh nonce is used on
    /// every call.
    pub(crate) fn save(&self, key: &MasterKey, entries: &[Entry]) -> Result<()> {
        let payload = codec::encode_entries(key, entries)?;
        format::write_vault(&self.path, &self.header, &payload)
    }

    /// Path to the vault file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Vault creation timestamp from the header.
    pub fn created_at(&self) -> chrono::DateTime<Utc> {
        self.header.created_at
    }
}
