//! JSON-file preference store.
//!
//! DESIGN
//! ======
//! One preference group maps to one file, `<dir>/<group>.json`, holding the
//! whole snapshot:
//!
//! ```json
//! { "revision": 3, "values": { "dark_mode": true } }
//! ```
//!
//! The file is read on first access and cached; nothing touches the disk
//! until the first edit. Writes go to a sibling temp file, are synced, then
//! renamed over the original so a crash never leaves a half-written group.
//!
//! ERROR HANDLING
//! ==============
//! A missing file is an empty group. A file that fails to parse is logged and
//! also treated as empty; the next edit overwrites it. Any other I/O failure
//! surfaces as [`StorageError::Io`].

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use super::{PrefValue, PreferenceStore, Preferences, StorageError};

pub struct FileStore {
    path: PathBuf,
    cache: Mutex<Option<Preferences>>,
    tx: watch::Sender<Preferences>,
}

impl FileStore {
    /// Store for `group` inside `dir`. Does not touch the filesystem.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, group: &str) -> Self {
        let path = dir.as_ref().join(format!("{group}.json"));
        let (tx, _rx) = watch::channel(Preferences::default());
        Self { path, cache: Mutex::new(None), tx }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the group file and publish it if another process changed it.
    ///
    /// Published revisions never go backwards: a file that was deleted,
    /// corrupted or rewritten from scratch is adopted under the next revision
    /// after the cached one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file cannot be read.
    pub async fn refresh(&self) -> Result<Preferences, StorageError> {
        let mut cache = self.cache.lock().await;
        let on_disk = read_group(&self.path).await?;
        let Some(next) = reconcile(cache.as_ref(), on_disk) else {
            return Ok(cache.clone().unwrap_or_default());
        };
        debug!(path = %self.path.display(), revision = next.revision(), "preference group changed on disk");
        *cache = Some(next.clone());
        self.tx.send_replace(next.clone());
        Ok(next)
    }

    async fn cached(&self, cache: &mut Option<Preferences>) -> Result<Preferences, StorageError> {
        if let Some(prefs) = cache.as_ref() {
            return Ok(prefs.clone());
        }
        let prefs = read_group(&self.path).await?;
        debug!(path = %self.path.display(), revision = prefs.revision(), entries = prefs.len(), "preference group loaded");
        *cache = Some(prefs.clone());
        self.tx.send_replace(prefs.clone());
        Ok(prefs)
    }

    async fn commit(&self, cache: &mut Option<Preferences>, next: Preferences) -> Result<Preferences, StorageError> {
        write_group(&self.path, &next).await?;
        *cache = Some(next.clone());
        self.tx.send_replace(next.clone());
        Ok(next)
    }
}

#[async_trait::async_trait]
impl PreferenceStore for FileStore {
    async fn load(&self) -> Result<Preferences, StorageError> {
        let mut cache = self.cache.lock().await;
        self.cached(&mut cache).await
    }

    async fn edit(&self, key: &str, value: PrefValue) -> Result<Preferences, StorageError> {
        let mut cache = self.cache.lock().await;
        let current = self.cached(&mut cache).await?;
        self.commit(&mut cache, current.with_value(key, value)).await
    }

    async fn remove(&self, key: &str) -> Result<Preferences, StorageError> {
        let mut cache = self.cache.lock().await;
        let current = self.cached(&mut cache).await?;
        match current.without(key) {
            Some(next) => self.commit(&mut cache, next).await,
            None => Ok(current),
        }
    }

    fn subscribe(&self) -> watch::Receiver<Preferences> {
        self.tx.subscribe()
    }
}

async fn read_group(path: &Path) -> Result<Preferences, StorageError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Preferences::default()),
        Err(source) => return Err(StorageError::Io { path: path.to_path_buf(), source }),
    };

    match serde_json::from_slice(&bytes) {
        Ok(prefs) => Ok(prefs),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "preference group unreadable; starting empty");
            Ok(Preferences::default())
        }
    }
}

async fn write_group(path: &Path, prefs: &Preferences) -> Result<(), StorageError> {
    let io_err = |source: std::io::Error| StorageError::Io { path: path.to_path_buf(), source };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
    }

    let bytes = serde_json::to_vec_pretty(prefs)?;
    let tmp = path.with_extension("json.tmp");

    if let Err(source) = replace_via(&tmp, path, &bytes).await {
        if let Err(e) = tokio::fs::remove_file(&tmp).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %tmp.display(), error = %e, "failed to remove temp preference file");
            }
        }
        return Err(io_err(source));
    }
    Ok(())
}

/// Write `bytes` to `tmp`, sync, then rename it over `path`.
async fn replace_via(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(tmp, path).await
}

/// Snapshot to cache and publish after reading `on_disk`, or `None` when the
/// cache already matches.
fn reconcile(cached: Option<&Preferences>, on_disk: Preferences) -> Option<Preferences> {
    let Some(cached) = cached else {
        return Some(on_disk);
    };
    if on_disk.revision() > cached.revision() {
        return Some(on_disk);
    }
    if on_disk.same_values(cached) {
        return None;
    }
    let revision = cached.revision() + 1;
    Some(on_disk.with_revision(revision))
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
