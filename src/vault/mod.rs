//! Vault module — encrypted entry storage.
//!
//! This module provides:
//! - The `Entry` type (`entry`)
//! - Sealing/unsealing of the entry collection (`codec`)
//! - The binary vault file envelope (`format`)
//! - File ownership, atomic persistence and open-exclusivity (`store`)
//! - The unlocked in-memory session (`session`)

pub mod codec;
pub mod entry;
pub mod format;
pub mod session;
pub mod store;

// Re-export the most commonly used items.
pub use entry::Entry;
pub use format::{StoredKdfParams, VaultHeader};
pub use session::VaultSession;
pub use store::VaultStore;
