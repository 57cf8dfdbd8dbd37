//! Theme manager — write-through setter plus a background store subscription.
//!
//! DESIGN
//! ======
//! Two paths update the observable: the background task that follows the
//! store's change stream, and `set_dark_mode` which applies its own commit as
//! soon as the store acknowledges it. Both go through `Shared::apply`, which
//! runs under the observable's lock and drops any snapshot older than the last
//! one applied. The observable therefore always holds the newest committed
//! value no matter which path gets there first.
//!
//! LIFECYCLE
//! =========
//! `initialize` spawns the subscription task. `dispose` cancels it and waits
//! for it to stop; dropping the manager cancels it without waiting.
//!
//! ERROR HANDLING
//! ==============
//! A failed initial load is logged and the manager stays in light mode while
//! it keeps following the change stream. A failed write is returned to the
//! caller and leaves the observable untouched.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{ThemeError, ThemeMode};
use crate::prefs::{PrefValue, PreferenceStore, Preferences, StorageError};

/// Buffered change events per observer before the oldest are dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ThemeState {
    is_dark: bool,
    /// Revision of the last applied snapshot; `None` until one arrives.
    revision: Option<u64>,
    /// Set once the initial load has finished, successfully or not.
    loaded: bool,
}

struct Shared {
    key: String,
    state: watch::Sender<ThemeState>,
    events: broadcast::Sender<bool>,
}

impl Shared {
    /// Apply a committed snapshot. Returns `false` if it was older than the
    /// current state and got dropped.
    fn apply(&self, prefs: &Preferences) -> bool {
        let is_dark = prefs.get_bool(&self.key) == Some(true);
        let revision = prefs.revision();
        let mut accepted = false;

        self.state.send_if_modified(|state| {
            if state.revision.is_some_and(|applied| revision < applied) {
                return false;
            }
            accepted = true;
            state.revision = Some(revision);
            if state.is_dark == is_dark {
                return false;
            }
            state.is_dark = is_dark;
            // Emitted under the lock so observers see changes in apply order.
            let _ = self.events.send(is_dark);
            true
        });

        if accepted {
            debug!(key = %self.key, revision, is_dark, "theme snapshot applied");
        } else {
            debug!(key = %self.key, revision, "stale theme snapshot dropped");
        }
        accepted
    }

    fn mark_loaded(&self) {
        self.state.send_if_modified(|state| !std::mem::replace(&mut state.loaded, true));
    }
}

// =============================================================================
// MANAGER
// =============================================================================

pub struct ThemeManager {
    store: Arc<dyn PreferenceStore>,
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ThemeManager {
    /// Manager over `store` reading the flag at `key`. Starts in light mode;
    /// nothing is read until [`initialize`](Self::initialize).
    #[must_use]
    pub fn new(store: Arc<dyn PreferenceStore>, key: impl Into<String>) -> Self {
        Self::with_event_capacity(store, key, DEFAULT_EVENT_CAPACITY)
    }

    #[must_use]
    pub fn with_event_capacity(store: Arc<dyn PreferenceStore>, key: impl Into<String>, capacity: usize) -> Self {
        let (state, _) = watch::channel(ThemeState::default());
        let (events, _) = broadcast::channel(capacity.max(1));
        let shared = Arc::new(Shared { key: key.into(), state, events });
        Self { store, shared, task: Mutex::new(None) }
    }

    /// `new` followed by `initialize`. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn start(store: Arc<dyn PreferenceStore>, key: impl Into<String>) -> Self {
        let mut manager = Self::new(store, key);
        let handle = manager.spawn_subscription();
        *manager.task.get_mut().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        manager
    }

    /// Begin following the stored flag: load it, then apply every change the
    /// store publishes until the manager is disposed.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::AlreadyInitialized`] on a second call.
    pub fn initialize(&self) -> Result<(), ThemeError> {
        let mut slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(ThemeError::AlreadyInitialized);
        }
        *slot = Some(self.spawn_subscription());
        Ok(())
    }

    fn spawn_subscription(&self) -> JoinHandle<()> {
        // Subscribe before loading so a commit racing the load is not missed.
        let changes = self.store.subscribe();
        let store = Arc::clone(&self.store);
        let shared = Arc::clone(&self.shared);
        info!(key = %self.shared.key, "theme manager initialized");
        tokio::spawn(follow_store(store, shared, changes))
    }

    /// Persist `is_dark`, then publish it.
    ///
    /// # Errors
    ///
    /// Returns the store's [`StorageError`] if the write fails; the observed
    /// value is left unchanged.
    pub async fn set_dark_mode(&self, is_dark: bool) -> Result<(), StorageError> {
        let committed = self
            .store
            .edit(&self.shared.key, PrefValue::Bool(is_dark))
            .await
            .inspect_err(|e| warn!(key = %self.shared.key, is_dark, error = %e, "theme preference write failed"))?;
        self.shared.apply(&committed);
        info!(key = %self.shared.key, is_dark, revision = committed.revision(), "theme preference saved");
        Ok(())
    }

    /// Flip the current mode. Returns the new dark flag.
    ///
    /// # Errors
    ///
    /// Same as [`set_dark_mode`](Self::set_dark_mode).
    pub async fn toggle(&self) -> Result<bool, StorageError> {
        let next = !self.is_dark();
        self.set_dark_mode(next).await?;
        Ok(next)
    }

    /// Delete the stored flag, returning to the light-mode default.
    ///
    /// # Errors
    ///
    /// Returns the store's [`StorageError`] if the write fails.
    pub async fn reset(&self) -> Result<(), StorageError> {
        let committed = self
            .store
            .remove(&self.shared.key)
            .await
            .inspect_err(|e| warn!(key = %self.shared.key, error = %e, "theme preference reset failed"))?;
        self.shared.apply(&committed);
        info!(key = %self.shared.key, "theme preference reset");
        Ok(())
    }

    #[must_use]
    pub fn observe(&self) -> ThemeObserver {
        ThemeObserver { state: self.shared.state.subscribe(), events: self.shared.events.subscribe() }
    }

    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.shared.state.borrow().is_dark
    }

    #[must_use]
    pub fn mode(&self) -> ThemeMode {
        ThemeMode::from_dark_flag(self.is_dark())
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    /// Stop following the store and wait for the subscription task to end.
    pub async fn dispose(self) {
        let handle = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "theme subscription task failed");
                }
            }
        }
        debug!(key = %self.shared.key, "theme manager disposed");
    }
}

impl Drop for ThemeManager {
    fn drop(&mut self) {
        let slot = self.task.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

async fn follow_store(store: Arc<dyn PreferenceStore>, shared: Arc<Shared>, mut changes: watch::Receiver<Preferences>) {
    match store.load().await {
        Ok(prefs) => {
            shared.apply(&prefs);
        }
        Err(e) => {
            warn!(key = %shared.key, error = %e, "theme preference load failed; staying in light mode");
        }
    }
    shared.mark_loaded();

    while changes.changed().await.is_ok() {
        let prefs = changes.borrow_and_update().clone();
        shared.apply(&prefs);
    }
    debug!(key = %shared.key, "preference change stream closed");
}

// =============================================================================
// OBSERVER
// =============================================================================

/// Read-only view of the theme flag.
pub struct ThemeObserver {
    state: watch::Receiver<ThemeState>,
    events: broadcast::Receiver<bool>,
}

impl ThemeObserver {
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.state.borrow().is_dark
    }

    #[must_use]
    pub fn mode(&self) -> ThemeMode {
        ThemeMode::from_dark_flag(self.is_dark())
    }

    /// Whether the manager has finished its first load attempt.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state.borrow().loaded
    }

    /// Resolve once the first load attempt has finished. Returns immediately
    /// if the manager is gone.
    pub async fn wait_loaded(&mut self) {
        let _ = self.state.wait_for(|state| state.loaded).await;
    }

    /// Next value change, in the order changes were applied. `None` once the
    /// manager is gone.
    ///
    /// An observer that falls more than the event capacity behind skips the
    /// missed events and continues with the oldest one still buffered.
    pub async fn next_change(&mut self) -> Option<bool> {
        loop {
            match self.events.recv().await {
                Ok(is_dark) => return Some(is_dark),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "theme observer lagged behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Clone for ThemeObserver {
    fn clone(&self) -> Self {
        Self { state: self.state.clone(), events: self.events.resubscribe() }
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
