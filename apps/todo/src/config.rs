//! Where the to-do app keeps its data.
//!
//! Configuration comes from environment variables, with command-line flags
//! applied on top by the binary:
//!
//! | Variable           | Default                          |
//! |--------------------|----------------------------------|
//! | `TODO_DATA_DIR`    | `<platform data dir>/reducible-todo` |
//! | `TODO_STORAGE_KEY` | `todos`                          |

use reducible_runtime::FileStorage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the data directory
pub const DATA_DIR_VAR: &str = "TODO_DATA_DIR";

/// Environment variable naming the storage slot
pub const STORAGE_KEY_VAR: &str = "TODO_STORAGE_KEY";

/// Storage slot used when none is configured
pub const DEFAULT_STORAGE_KEY: &str = "todos";

/// Directory created under the platform data directory
const APP_DIR: &str = "reducible-todo";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No data directory configured and the platform has none
    #[error("No data directory: set TODO_DATA_DIR or pass --data-dir")]
    NoDataDir,

    /// The storage key cannot name a slot
    #[error("Invalid storage key {0:?}: use ASCII letters, digits, '-', '_' or '.'")]
    InvalidStorageKey(String),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the storage slot files
    pub data_dir: PathBuf,
    /// Name of the slot holding the list
    pub storage_key: String,
}

impl AppConfig {
    /// Load configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if no data directory can be determined or the
    /// storage key is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if no data directory can be determined or the
    /// storage key is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let data_dir = match lookup(DATA_DIR_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        let storage_key = lookup(STORAGE_KEY_VAR).unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        Self::validated(data_dir, storage_key)
    }

    /// Replace the data directory
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Replace the storage key
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidStorageKey`] if `key` cannot name a slot.
    pub fn with_storage_key(self, key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::validated(self.data_dir, key.into())
    }

    /// Path of the file holding the list
    #[must_use]
    pub fn slot_file(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.storage_key))
    }

    /// Storage rooted at the data directory
    #[must_use]
    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(&self.data_dir)
    }

    fn validated(data_dir: PathBuf, storage_key: String) -> Result<Self, ConfigError> {
        if !FileStorage::is_valid_key(&storage_key) {
            return Err(ConfigError::InvalidStorageKey(storage_key));
        }

        Ok(Self {
            data_dir,
            storage_key,
        })
    }

    /// Data directory, for display
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(ConfigError::NoDataDir)
}
