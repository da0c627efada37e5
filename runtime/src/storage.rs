//! Storage backends for the Store.
//!
//! - [`MemoryStorage`]: process-local map, for tests and storage-less sessions
//! - [`FileStorage`]: one file per slot inside a directory
//! - `LocalStorage`: the browser's `window.localStorage` (`wasm32` only)

use reducible_core::storage::{Storage, StorageError};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory storage
///
/// Nothing survives the process; handy in tests and as a stand-in when no
/// durable backend is available.
///
/// # Example
///
/// ```
/// use reducible_core::storage::Storage;
/// use reducible_runtime::MemoryStorage;
///
/// # fn main() -> Result<(), reducible_core::storage::StorageError> {
/// let storage = MemoryStorage::new().with_entry("todos", "[]");
/// assert_eq!(storage.get("todos")?.as_deref(), Some("[]"));
/// assert_eq!(storage.get("other")?, None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a slot
    #[must_use]
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        self
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// File-backed storage
///
/// Each slot is stored as `<dir>/<key>.json`. Writes go to a temporary
/// sibling file first and are renamed into place, so a crash mid-write
/// leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `dir` (created on first write)
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns true if `key` can name a slot file
    ///
    /// Keys are non-empty, made of ASCII letters, digits, `-`, `_` and `.`,
    /// and do not start with a dot.
    #[must_use]
    pub fn is_valid_key(key: &str) -> bool {
        !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }

    /// Path of the file backing `key`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AccessDenied`] for keys that would escape the
    /// storage directory.
    pub fn slot_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !Self::is_valid_key(key) {
            return Err(StorageError::AccessDenied(format!("invalid storage key {key:?}")));
        }

        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn map_io(error: std::io::Error) -> StorageError {
    match error.kind() {
        ErrorKind::StorageFull => StorageError::QuotaExceeded,
        ErrorKind::PermissionDenied => StorageError::AccessDenied(error.to_string()),
        _ => StorageError::Io(error),
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(map_io(error)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.slot_path(key)?;
        let tmp = path.with_extension("json.tmp");

        fs::create_dir_all(&self.dir).map_err(map_io)?;
        fs::write(&tmp, value).map_err(map_io)?;
        fs::rename(&tmp, &path).map_err(map_io)?;
        tracing::trace!(path = %path.display(), bytes = value.len(), "Wrote storage slot");
        Ok(())
    }
}

/// Browser `localStorage`
///
/// The handle is looked up on every call; a page with storage disabled
/// reports [`StorageError::Unavailable`] instead of failing at construction.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn handle() -> Result<web_sys::Storage, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|error| StorageError::AccessDenied(format!("{error:?}")))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::handle()?
            .get_item(key)
            .map_err(|error| StorageError::AccessDenied(format!("{error:?}")))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::handle()?.set_item(key, value).map_err(|error| {
            let message = format!("{error:?}");
            if message.contains("QuotaExceeded") {
                StorageError::QuotaExceeded
            } else {
                StorageError::AccessDenied(message)
            }
        })
    }
}
