//! The `Entry` type stored inside a vault.
//!
//! An entry pairs a display title with a secret value.  Entries only
//! ever exist in plaintext inside an unlocked session; the persistence
//! layer sees them exclusively through the sealed payload.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroize;

/// A single vault entry: a title and its secret value.
///
/// Ids are random UUIDv4, so rapid insertion cannot collide the way a
/// wall-clock id would.  Titles are not required to be unique.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entry {
    /// Opaque unique identifier.
    pub id: Uuid,

    /// Display title (e.g. "Gmail").  Not treated as secret.
    pub title: String,

    /// The secret value.  Wiped on lock/drop of the owning session.
    pub value: String,

    /// When this entry was first created.
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Build a new entry with a fresh random id.
    pub(crate) fn new(title: &str, value: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.to_string(),
            value: value.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Overwrite the secret value in place.
    pub(crate) fn wipe(&mut self) {
        self.value.zeroize();
    }
}

// Manual Debug so a stray `{:?}` in caller code never prints the secret.
impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("value", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}
