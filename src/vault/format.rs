//! Binary vault file format.
//!
//! A `.vault` file has this layout:
//!
//! ```text
//! [PVLT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][nonce: 12 bytes][ciphertext + tag]
//! ```
//!
//! - **Magic** (`PVLT`): identifies the file as a PassVault vault.
//! - **Version**: format version (currently `1`).
//! - **Header length**: little-endian u32 telling us where the header
//!   JSON ends and the sealed payload begins.
//! - **Header JSON**: serialized `VaultHeader` — KDF params, salt and
//!   password verifier.  Unencrypted by design: everything needed to
//!   re-derive and check the key, nothing that leaks it.
//! - **Nonce**: the 12-byte AES-GCM nonce for this payload, fresh on
//!   every save.
//! - **Ciphertext**: the sealed entry collection, 16-byte auth tag
//!   trailing.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::aead::{SealedPayload, NONCE_LEN, TAG_LEN};
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"PVLT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

// ---------------------------------------------------------------------------
// VaultHeader
// ---------------------------------------------------------------------------

/// Argon2 parameters stored in the vault header so the exact same KDF
/// settings are used when re-opening.  A cost upgrade re-derives with
/// these and re-encrypts under new ones.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoredKdfParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// Unencrypted metadata stored at the beginning of a vault file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultHeader {
    /// Format version.
    pub version: u8,

    /// Argon2 params used at vault creation.
    pub kdf: StoredKdfParams,

    /// The salt used for Argon2id key derivation (base64 in JSON).
    /// Generated once at creation, never regenerated — a new salt
    /// would orphan all existing ciphertext.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    /// Password verifier (base64 in JSON): HMAC over a fixed context
    /// under an HKDF sub-key, checked in constant time before any
    /// decryption is attempted.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub verifier: Vec<u8>,

    /// When this vault was first created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Raw data read from a vault file on disk.
pub struct RawVault {
    pub header: VaultHeader,
    pub payload: SealedPayload,
}

/// Write a vault file to disk **atomically**.
///
/// 1. Serialize the header to JSON.
/// 2. Assemble the full binary envelope in memory.
/// 3. Write it to a temp file in the same directory and fsync.
/// 4. Rename the temp file over the target path.
///
/// The rename ensures readers never see a half-written file; on any
/// failure before the rename the temp file is removed and the original
/// file is left untouched.
pub fn write_vault(path: &Path, header: &VaultHeader, payload: &SealedPayload) -> Result<()> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| VaultError::EncryptionFailed(format!("header serialization: {e}")))?;

    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        VaultError::EncryptionFailed(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;

    let total = PREFIX_LEN + header_bytes.len() + NONCE_LEN + payload.ciphertext.len();
    let mut buf = Vec::with_capacity(total);

    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&header_len.to_le_bytes()); // 4 bytes LE
    buf.extend_from_slice(&header_bytes); // header JSON
    buf.extend_from_slice(&payload.nonce); // 12 bytes
    buf.extend_from_slice(&payload.ciphertext); // ciphertext + tag

    write_atomic(path, &buf)
}

/// Temp-file-then-rename write.  The temp file lives in the same
/// directory so the rename is atomic on the same filesystem.
fn write_atomic(path: &Path, buf: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let result = (|| -> Result<()> {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(buf)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        // The rename never happened; make sure no stale temp file remains.
        let _ = fs::remove_file(&tmp_path);
    }

    result
}

/// Read a vault file from disk and split it into header + payload.
///
/// Only structural validation happens here.  Password checking and
/// payload authentication are the caller's job — nothing returned from
/// this function has been verified yet.
pub fn read_vault(path: &Path) -> Result<RawVault> {
    let data = fs::read(path)?;

    // Minimum size: prefix + empty header + nonce + tag.
    if data.len() < PREFIX_LEN + NONCE_LEN + TAG_LEN {
        return Err(VaultError::Corrupt(
            "file too small to be a valid vault".into(),
        ));
    }

    // --- Parse the fixed-size prefix ---

    if &data[0..4] != MAGIC {
        return Err(VaultError::UnsupportedFormat(
            "missing PVLT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(VaultError::UnsupportedFormat(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| VaultError::Corrupt("bad header length".into()))?,
    );
    let header_len = usize::try_from(header_len_u32).map_err(|_| {
        VaultError::Corrupt(format!(
            "header length {header_len_u32} exceeds platform address space"
        ))
    })?;

    let header_end = PREFIX_LEN + header_len;
    if header_end + NONCE_LEN + TAG_LEN > data.len() {
        return Err(VaultError::Corrupt(
            "header length exceeds file size".into(),
        ));
    }

    // --- Split the variable-length sections ---

    let header: VaultHeader = serde_json::from_slice(&data[PREFIX_LEN..header_end])
        .map_err(|e| VaultError::Corrupt(format!("header JSON: {e}")))?;

    let nonce_end = header_end + NONCE_LEN;
    let nonce: [u8; NONCE_LEN] = data[header_end..nonce_end]
        .try_into()
        .map_err(|_| VaultError::Corrupt("bad nonce length".into()))?;

    let ciphertext = data[nonce_end..].to_vec();

    Ok(RawVault {
        header,
        payload: SealedPayload { nonce, ciphertext },
    })
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}
