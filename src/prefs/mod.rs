//! Preference store — durable key-value storage for small typed settings.
//!
//! DESIGN
//! ======
//! A store is an async map from string keys to primitive values. Every
//! committed edit produces a new immutable [`Preferences`] snapshot with a
//! monotonically increasing `revision`, and that snapshot is published on a
//! `watch` channel so observers can follow changes without polling.
//!
//! Stores are injected into consumers as `Arc<dyn PreferenceStore>`; there is
//! no process-wide handle.

pub mod file;
pub mod memory;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub use file::FileStore;
pub use memory::MemoryStore;

// =============================================================================
// ERROR
// =============================================================================

/// Raised when the backing storage cannot complete a read or write.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem I/O failed (missing permissions, disk full, ...).
    #[error("preference storage I/O failed at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be serialized for writing.
    #[error("preference encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The store refused the operation.
    #[error("preference storage unavailable: {0}")]
    Unavailable(String),
}

// =============================================================================
// VALUES
// =============================================================================

/// A primitive preference value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<bool> for PrefValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Immutable snapshot of every key in a preference group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    revision: u64,
    #[serde(default)]
    values: BTreeMap<String, PrefValue>,
}

impl Preferences {
    /// Commit counter. `0` means nothing has been committed yet.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.values.get(key)
    }

    /// Boolean at `key`, or `None` when the key is missing or holds another type.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(PrefValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PrefValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Next snapshot with `key` set to `value`.
    pub(crate) fn with_value(&self, key: &str, value: PrefValue) -> Self {
        let mut values = self.values.clone();
        values.insert(key.to_owned(), value);
        Self { revision: self.revision + 1, values }
    }

    /// Next snapshot without `key`, or `None` when the key is absent.
    pub(crate) fn without(&self, key: &str) -> Option<Self> {
        if !self.values.contains_key(key) {
            return None;
        }
        let mut values = self.values.clone();
        values.remove(key);
        Some(Self { revision: self.revision + 1, values })
    }

    /// Same entries as `other`, ignoring revisions.
    pub(crate) fn same_values(&self, other: &Self) -> bool {
        self.values == other.values
    }

    /// This snapshot's entries under a different revision.
    pub(crate) fn with_revision(self, revision: u64) -> Self {
        Self { revision, ..self }
    }
}

// =============================================================================
// STORE CONTRACT
// =============================================================================

/// Asynchronous durable key-value store.
///
/// Edits on a single store are serialized and each one is atomic for its key.
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Current durable state. The first call may read backing storage.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing storage cannot be read.
    async fn load(&self) -> Result<Preferences, StorageError>;

    /// Set `key` to `value`, resolving once the write is durable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write does not complete; the stored
    /// state is unchanged in that case.
    async fn edit(&self, key: &str, value: PrefValue) -> Result<Preferences, StorageError>;

    /// Remove `key`. Removing an absent key commits nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write does not complete.
    async fn remove(&self, key: &str) -> Result<Preferences, StorageError>;

    /// Change stream carrying every committed snapshot.
    fn subscribe(&self) -> watch::Receiver<Preferences>;
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
