use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, error, warn};

use super::KeyValueStore;
use crate::error::{Error, Result};

/// Keeps the session as a flat JSON object on disk.
///
/// Every change rewrites the whole document through a temporary file and a
/// rename, so a crash mid-write leaves either the old or the new contents.
pub struct FileStore {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
    /// Set while memory holds removals the disk copy has not caught up with.
    dirty: AtomicBool,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable document is discarded with a warning.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let items = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(items) => items,
                Err(e) => {
                    warn!(
                        "Session file '{}' is not a valid JSON object ({}); starting empty",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(Error::Storage(format!(
                    "cannot read session file '{}': {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(FileStore {
            path,
            items: Mutex::new(items),
            dirty: AtomicBool::new(false),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn items(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Storage(format!("cannot create '{}': {}", parent.display(), e))
            })?;
        }
        let document =
            serde_json::to_string_pretty(items).map_err(|e| Error::Storage(e.to_string()))?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, document).map_err(|e| {
            Error::Storage(format!("cannot write '{}': {}", staging.display(), e))
        })?;
        fs::rename(&staging, &self.path).map_err(|e| {
            Error::Storage(format!("cannot replace '{}': {}", self.path.display(), e))
        })?;
        debug!("Persisted {} session keys to '{}'", items.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_name(&self) -> &str {
        "file"
    }

    fn get_item(&self, key: &str) -> Option<String> {
        self.items().get(key).cloned()
    }

    fn set_items(&self, items: &[(&str, String)]) -> Result<()> {
        let mut current = self.items();
        let mut next = current.clone();
        for (key, value) in items {
            next.insert((*key).to_string(), value.clone());
        }
        // Only publish in memory once the disk copy is in place.
        self.persist(&next)?;
        *current = next;
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn remove_items(&self, keys: &[&str]) {
        let mut current = self.items();
        let before = current.len();
        for key in keys {
            current.remove(*key);
        }
        let unchanged = current.len() == before && !self.dirty.load(Ordering::SeqCst);
        if unchanged && self.path.exists() {
            return;
        }
        match self.persist(&current) {
            Ok(()) => self.dirty.store(false, Ordering::SeqCst),
            Err(e) => {
                // Retried by the next write; the disk copy still has the keys.
                self.dirty.store(true, Ordering::SeqCst);
                error!("Failed to persist session removal: {}", e);
            }
        }
    }
}
