use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// All errors that can occur in PassVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Authentication / integrity errors ---
    #[error("Wrong master password")]
    WrongPassword,

    #[error("Vault payload failed authentication — file may be tampered")]
    Tampered,

    #[error("Vault file is corrupt: {0}")]
    Corrupt(String),

    #[error("Unsupported vault format: {0}")]
    UnsupportedFormat(String),

    // --- Store errors ---
    #[error("Vault already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("Vault at {0} is already open")]
    AlreadyOpen(PathBuf),

    // --- Session errors ---
    #[error("Session is locked")]
    LockedSession,

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("No entry with id {0}")]
    EntryNotFound(Uuid),

    // --- Unlock gate errors ---
    #[error("Unlock token has expired")]
    TokenExpired,

    #[error("Unknown unlock token")]
    UnknownToken,

    // --- Crypto errors ---
    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for PassVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
