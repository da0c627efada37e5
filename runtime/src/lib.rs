//! # Reducible Runtime
//!
//! Runtime implementation for the Reducible architecture.
//!
//! This crate provides the [`Store`] that owns a reducer's state, writes the
//! persisted part of that state back to a storage slot after every
//! transition, and notifies subscribers.
//!
//! ## Core Components
//!
//! - **Store**: Loads the initial state, runs the reducer, writes back, publishes snapshots
//! - **Storage backends**: [`MemoryStorage`], [`FileStorage`], and `LocalStorage` on `wasm32`
//! - **`StoreConfig`**: Storage slot name and subscriber buffer size
//!
//! ## Failure model
//!
//! Storage is best effort. A missing, unreadable, or corrupt slot at startup
//! falls back to the seed state; a failed write is logged and counted but never
//! rolls back the in-memory state. The next successful write supersedes any
//! earlier loss because every write carries the full state.
//!
//! ## Example
//!
//! ```ignore
//! use reducible_runtime::{MemoryStorage, Store, StoreConfig};
//! use std::sync::Arc;
//!
//! let store = Store::with_config(
//!     seed_state,
//!     my_reducer,
//!     environment,
//!     Arc::new(MemoryStorage::new()),
//!     StoreConfig::new("notes"),
//! );
//!
//! // Send an action
//! store.dispatch(Action::DoSomething);
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use reducible_core::{
    action::Action,
    codec::{self, CodecError},
    reducer::Reducer,
    state::Persistent,
    storage::{Storage, StorageError},
};
use std::sync::{Arc, PoisonError, RwLock};

/// Storage backends
pub mod storage;

pub use storage::{FileStorage, MemoryStorage};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;

/// Error types for the Store runtime
pub mod error {
    use super::{CodecError, StorageError};
    use thiserror::Error;

    /// Errors that can occur while the Store talks to storage
    ///
    /// The Store itself recovers from all of these. They are only returned
    /// from [`Store::persist_now`](crate::Store::persist_now), for callers that
    /// want to report a failed flush.
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// The storage backend failed
        #[error(transparent)]
        Storage(#[from] StorageError),

        /// The snapshot could not be encoded or decoded
        #[error(transparent)]
        Codec(#[from] CodecError),
    }
}

pub use error::StoreError;

/// Default storage slot name
pub const DEFAULT_STORAGE_KEY: &str = "state";

/// Default number of snapshots buffered per subscriber
pub const DEFAULT_BROADCAST_CAPACITY: usize = 16;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use reducible_runtime::StoreConfig;
///
/// let config = StoreConfig::new("todos").with_broadcast_capacity(64);
/// assert_eq!(config.storage_key, "todos");
/// assert_eq!(config.broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Name of the storage slot holding the persisted snapshot
    pub storage_key: String,
    /// Number of snapshots buffered per subscriber before it starts lagging
    pub broadcast_capacity: usize,
}

impl StoreConfig {
    /// Create a configuration for the given storage slot
    #[must_use]
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            broadcast_capacity: DEFAULT_BROADCAST_CAPACITY,
        }
    }

    /// Set the subscriber buffer size (at least 1)
    #[must_use]
    pub fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity.max(1);
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_KEY)
    }
}

/// Store module - The persistent store adapter
pub mod store {
    use super::{
        Action, Arc, Persistent, PoisonError, Reducer, RwLock, Storage, StoreConfig, StoreError,
        codec,
    };
    use tokio::sync::broadcast;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (an `Arc` snapshot behind an `RwLock`, replaced on every transition)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Storage (initial load and write-back of the persisted part)
    /// 5. Subscribers (every new snapshot is broadcast)
    ///
    /// A `Store` value is always initialized: the storage slot is read exactly
    /// once, synchronously, inside the constructor.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    ///
    /// # Concurrency
    ///
    /// `dispatch` holds the write lock across reduce, write-back, and publish,
    /// so transitions never interleave and storage sees writes in transition
    /// order.
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: RwLock<Arc<S>>,
        reducer: R,
        environment: E,
        storage: Arc<dyn Storage>,
        storage_key: String,
        snapshot_broadcast: broadcast::Sender<Arc<S>>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
        S: Persistent,
        A: Action,
    {
        /// Create a new store with the default configuration
        ///
        /// Loads the persisted snapshot from the default storage slot into
        /// `seed`. Falls back to `seed` unchanged if the slot is empty,
        /// unreadable, or corrupt.
        ///
        /// # Arguments
        ///
        /// - `seed`: Default state, also the source of every transient field
        /// - `reducer`: The reducer implementation (business logic)
        /// - `environment`: Injected dependencies
        /// - `storage`: Backend holding the persisted snapshot
        #[must_use]
        pub fn new(seed: S, reducer: R, environment: E, storage: Arc<dyn Storage>) -> Self {
            Self::with_config(seed, reducer, environment, storage, StoreConfig::default())
        }

        /// Create a new store with custom configuration
        ///
        /// # Example
        ///
        /// ```ignore
        /// let store = Store::with_config(
        ///     Session::default(),
        ///     SessionReducer::new(),
        ///     environment,
        ///     Arc::new(FileStorage::new("/var/lib/notes")),
        ///     StoreConfig::new("notes"),
        /// );
        /// ```
        #[must_use]
        pub fn with_config(
            seed: S,
            reducer: R,
            environment: E,
            storage: Arc<dyn Storage>,
            config: StoreConfig,
        ) -> Self {
            let (snapshot_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));
            let initial = Self::load(storage.as_ref(), &config.storage_key, seed);

            Self {
                state: RwLock::new(Arc::new(initial)),
                reducer,
                environment,
                storage,
                storage_key: config.storage_key,
                snapshot_broadcast,
            }
        }

        /// Read the storage slot into `seed`, swallowing every failure
        fn load(storage: &dyn Storage, key: &str, mut seed: S) -> S {
            match Self::read_snapshot(storage, key) {
                Ok(Some(snapshot)) => {
                    seed.restore(snapshot);
                    tracing::debug!(key, "Restored persisted state");
                },
                Ok(None) => {
                    tracing::debug!(key, "No persisted state, starting from seed");
                },
                Err(error) => {
                    tracing::warn!(key, %error, "Failed to load persisted state, starting from seed");
                    metrics::counter!("store.load.fallbacks").increment(1);
                },
            }
            seed
        }

        fn read_snapshot(storage: &dyn Storage, key: &str) -> Result<Option<S::Snapshot>, StoreError> {
            let Some(blob) = storage.get(key)? else {
                return Ok(None);
            };

            // An empty slot is treated like a missing one.
            if blob.trim().is_empty() {
                return Ok(None);
            }

            Ok(Some(codec::decode(&blob)?))
        }

        /// Serialize the persisted part of `state` into the storage slot
        fn write_back(&self, state: &S) -> Result<(), StoreError> {
            let blob = codec::encode(state.snapshot())?;
            self.storage.set(&self.storage_key, &blob)?;
            Ok(())
        }

        /// Send an action to the store
        ///
        /// Runs the reducer against the current state, installs the result
        /// as the new current state, writes it back to storage (unless the
        /// action is transient), and publishes it to subscribers.
        ///
        /// Storage failures are logged and counted; they never undo the
        /// transition and never reach the caller.
        #[tracing::instrument(skip(self, action), fields(action = action.name()), name = "store_dispatch")]
        pub fn dispatch(&self, action: A) {
            let name = action.name();
            let transient = action.is_transient();
            metrics::counter!("store.dispatch.total", "action" => name).increment(1);

            let mut current = self.state.write().unwrap_or_else(PoisonError::into_inner);
            tracing::trace!("Acquired write lock on state");

            let next = Arc::new(self.reducer.reduce(&current, action, &self.environment));
            *current = Arc::clone(&next);

            if transient {
                tracing::trace!("Transient action, skipping write-back");
            } else if let Err(error) = self.write_back(&next) {
                tracing::warn!(key = %self.storage_key, %error, "Failed to persist state");
                metrics::counter!("store.persist.failures").increment(1);
            }

            if self.snapshot_broadcast.send(next).is_err() {
                tracing::trace!("No subscribers for state snapshot");
            }

            tracing::debug!("Action processing completed");
        }

        /// Write the current state to storage immediately
        ///
        /// Useful before exiting, or to persist a seed that no action has
        /// touched yet.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError`] if encoding or the storage write fails. The
        /// in-memory state is unaffected either way.
        pub fn persist_now(&self) -> Result<(), StoreError> {
            let current = self.state.read().unwrap_or_else(PoisonError::into_inner);
            self.write_back(&current)
        }
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.entries.len());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            f(&state)
        }

        /// Get the current state snapshot
        ///
        /// The snapshot is immutable; later dispatches install a new one and
        /// leave this one untouched.
        #[must_use]
        pub fn snapshot(&self) -> Arc<S> {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(&state)
        }

        /// Subscribe to state snapshots
        ///
        /// Every dispatch publishes the state it produced. A receiver that
        /// falls more than the configured capacity behind gets
        /// `RecvError::Lagged` and resumes from the oldest buffered snapshot;
        /// since each snapshot is complete, skipping old ones loses nothing.
        ///
        /// # Example
        ///
        /// ```ignore
        /// let mut updates = store.subscribe();
        /// store.dispatch(Action::Increment);
        /// let latest = updates.try_recv()?;
        /// ```
        #[must_use]
        pub fn subscribe(&self) -> broadcast::Receiver<Arc<S>> {
            self.snapshot_broadcast.subscribe()
        }

        /// Name of the storage slot this store writes to
        #[must_use]
        pub fn storage_key(&self) -> &str {
            &self.storage_key
        }

        /// Access the injected environment
        #[must_use]
        pub const fn environment(&self) -> &E {
            &self.environment
        }
    }
}

pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.broadcast_capacity, DEFAULT_BROADCAST_CAPACITY);
    }

    #[test]
    fn config_capacity_is_never_zero() {
        let config = StoreConfig::new("k").with_broadcast_capacity(0);
        assert_eq!(config.broadcast_capacity, 1);
    }

    #[test]
    fn store_error_wraps_storage_error() {
        let err: StoreError = StorageError::QuotaExceeded.into();
        assert_eq!(err.to_string(), "Storage quota exceeded");
    }
}
