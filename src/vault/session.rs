//! The unlocked in-memory view of a vault.
//!
//! A `VaultSession` is the only place plaintext entries exist.  It is a
//! two-state machine: `Unlocked` permits entry operations; `lock()` is
//! terminal for the handle — the master key and every secret value are
//! zeroized, the path claim is released, and all further operations
//! fail `LockedSession`.

use std::path::Path;

use uuid::Uuid;

use crate::crypto::keys::MasterKey;
use crate::errors::{Result, VaultError};

use super::entry::Entry;
use super::store::{PathGuard, VaultStore};

/// An unlocked vault: the ordered entry collection plus the key that
/// persists it.
pub struct VaultSession {
    store: VaultStore,
    /// Released on lock so the vault can be reopened.
    guard: Option<PathGuard>,
    /// `None` once locked.
    key: Option<MasterKey>,
    /// Insertion-ordered; never reordered.
    entries: Vec<Entry>,
    dirty: bool,
}

impl VaultSession {
    pub(crate) fn new(
        store: VaultStore,
        guard: PathGuard,
        key: MasterKey,
        entries: Vec<Entry>,
    ) -> Self {
        Self {
            store,
            guard: Some(guard),
            key: Some(key),
            entries,
            dirty: false,
        }
    }

    fn ensure_unlocked(&self) -> Result<&MasterKey> {
        self.key.as_ref().ok_or(VaultError::LockedSession)
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Append a new entry and return its fresh id.
    ///
    /// Both title and value must be non-empty (a whitespace-only title
    /// counts as empty).  Marks the session dirty; nothing touches disk
    /// until `persist`.
    pub fn add_entry(&mut self, title: &str, value: &str) -> Result<Uuid> {
        self.ensure_unlocked()?;

        if title.trim().is_empty() {
            return Err(VaultError::InvalidEntry("title cannot be empty".into()));
        }
        if value.is_empty() {
            return Err(VaultError::InvalidEntry("value cannot be empty".into()));
        }

        let entry = Entry::new(title, value);
        let id = entry.id;
        self.entries.push(entry);
        self.dirty = true;
        Ok(id)
    }

    /// Remove the entry with the given id.
    pub fn delete_entry(&mut self, id: Uuid) -> Result<()> {
        self.ensure_unlocked()?;

        let position = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(VaultError::EntryNotFound(id))?;

        let mut removed = self.entries.remove(position);
        removed.wipe();
        self.dirty = true;
        Ok(())
    }

    /// Read-only view of all entries, in insertion order.
    pub fn list_entries(&self) -> Result<&[Entry]> {
        self.ensure_unlocked()?;
        Ok(&self.entries)
    }

    /// Number of entries currently in the session.
    pub fn entry_count(&self) -> Result<usize> {
        self.ensure_unlocked()?;
        Ok(self.entries.len())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Seal the entry collection and write it to disk atomically.
    ///
    /// No-op when nothing changed since the last save, so calling it
    /// twice in a row is cheap and leaves an equally decodable file.
    /// Saves are serialized per session by `&mut self`.
    pub fn persist(&mut self) -> Result<()> {
        let key = self.key.as_ref().ok_or(VaultError::LockedSession)?;

        if !self.dirty {
            return Ok(());
        }

        self.store.save(key, &self.entries)?;
        self.dirty = false;
        Ok(())
    }

    /// Lock the session: zero the master key and every secret value,
    /// release the path claim.
    ///
    /// Terminal for this handle — every subsequent operation fails
    /// `LockedSession`.  Unsaved mutations are discarded; call
    /// `persist` first if they matter.  Reopening requires the master
    /// password (or a still-valid `AuthGate` token from before the
    /// lock).
    pub fn lock(&mut self) {
        for entry in &mut self.entries {
            entry.wipe();
        }
        self.entries.clear();
        self.key = None; // MasterKey zeroizes on drop
        self.guard = None;
        self.dirty = false;
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns `true` once `lock()` has run.
    pub fn is_locked(&self) -> bool {
        self.key.is_none()
    }

    /// Returns `true` if there are unsaved mutations.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Path to the vault file on disk.
    pub fn path(&self) -> &Path {
        self.store.path()
    }

    /// Vault creation timestamp.
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.store.created_at()
    }
}

impl Drop for VaultSession {
    fn drop(&mut self) {
        // Same hygiene as lock(): no plaintext survives the session.
        for entry in &mut self.entries {
            entry.wipe();
        }
    }
}
