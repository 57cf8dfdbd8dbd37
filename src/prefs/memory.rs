//! In-process preference store.
//!
//! Holds the snapshot in memory only. Read and write failures can be
//! switched on at runtime so callers can exercise their error paths.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};

use super::{PrefValue, PreferenceStore, Preferences, StorageError};

pub struct MemoryStore {
    state: Mutex<Preferences>,
    tx: watch::Sender<Preferences>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_preferences(Preferences::default())
    }

    /// Start from an existing snapshot, e.g. one left by a previous run.
    #[must_use]
    pub fn with_preferences(initial: Preferences) -> Self {
        let (tx, _rx) = watch::channel(initial.clone());
        Self {
            state: Mutex::new(initial),
            tx,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent `load` calls fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent `edit`/`remove` calls fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Current snapshot without going through the failure switches.
    pub async fn snapshot(&self) -> Preferences {
        self.state.lock().await.clone()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store rejected write".into()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PreferenceStore for MemoryStore {
    async fn load(&self) -> Result<Preferences, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store rejected read".into()));
        }
        Ok(self.state.lock().await.clone())
    }

    async fn edit(&self, key: &str, value: PrefValue) -> Result<Preferences, StorageError> {
        let mut state = self.state.lock().await;
        self.check_writable()?;
        let next = state.with_value(key, value);
        *state = next.clone();
        // Publish under the lock so the stream sees commits in revision order.
        self.tx.send_replace(next.clone());
        Ok(next)
    }

    async fn remove(&self, key: &str) -> Result<Preferences, StorageError> {
        let mut state = self.state.lock().await;
        self.check_writable()?;
        let Some(next) = state.without(key) else {
            return Ok(state.clone());
        };
        *state = next.clone();
        self.tx.send_replace(next.clone());
        Ok(next)
    }

    fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
