//! Key-value storage abstraction.
//!
//! The runtime keeps one serialized blob per named slot. Backends only need a
//! string `get`/`set` surface; what goes into the blob is decided by the
//! [`codec`](crate::codec) module.
//!
//! Both operations may fail: storage can be disabled, full, or simply not
//! there. Callers in the runtime treat every failure as recoverable.

use std::sync::Arc;
use thiserror::Error;

/// Errors raised by a storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backend cannot be reached at all (disabled, not present)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the write because it is full
    #[error("Storage quota exceeded")]
    QuotaExceeded,

    /// The backend refused access to the slot
    #[error("Storage access denied: {0}")]
    AccessDenied(String),

    /// Filesystem error from a file-backed store
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A key-value surface holding arbitrarily sized UTF-8 strings
///
/// Methods take `&self`; backends use interior mutability so a single
/// instance can be shared through an `Arc`.
///
/// # Example
///
/// ```
/// use reducible_core::storage::{Storage, StorageError};
/// use std::collections::HashMap;
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct Map(Mutex<HashMap<String, String>>);
///
/// impl Storage for Map {
///     fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
///         let map = self.0.lock().map_err(|e| StorageError::Unavailable(e.to_string()))?;
///         Ok(map.get(key).cloned())
///     }
///
///     fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
///         let mut map = self.0.lock().map_err(|e| StorageError::Unavailable(e.to_string()))?;
///         map.insert(key.to_string(), value.to_string());
///         Ok(())
///     }
/// }
///
/// # fn main() -> Result<(), StorageError> {
/// let storage = Map::default();
/// assert_eq!(storage.get("todos")?, None);
/// storage.set("todos", "[]")?;
/// assert_eq!(storage.get("todos")?.as_deref(), Some("[]"));
/// # Ok(())
/// # }
/// ```
pub trait Storage: Send + Sync {
    /// Read the blob stored under `key`, `None` if the slot is empty
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}
