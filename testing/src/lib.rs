//! # Reducible Testing
//!
//! Testing utilities and helpers for the Reducible architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A storage backend with switchable failures
//! - A Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use reducible_testing::{FailingStorage, test_ids};
//! use reducible_runtime::Store;
//! use std::sync::Arc;
//!
//! #[test]
//! fn write_failures_keep_memory_state() {
//!     let storage = Arc::new(FailingStorage::new().failing_writes());
//!     let store = Store::new(NotesState::default(), NotesReducer, test_ids(), storage);
//!
//!     store.dispatch(NotesAction::Append { text: "x".into() });
//!
//!     assert_eq!(store.state(|s| s.entries.len()), 1);
//! }
//! ```

use reducible_core::environment::IdGenerator;
use reducible_core::storage::{Storage, StorageError};
use reducible_core::Uuid;
use reducible_runtime::MemoryStorage;


pub use reducer_test::ReducerTest;

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{IdGenerator, MemoryStorage, Storage, StorageError, Uuid};
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

    /// Predictable id generator
    ///
    /// Yields `00000000-0000-0000-0000-000000000001`, `...0002`, and so on,
    /// making ids in assertions reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use reducible_core::environment::IdGenerator;
    /// use reducible_testing::mocks::SequentialIds;
    ///
    /// let ids = SequentialIds::new();
    /// assert_eq!(ids.next_id().as_u128(), 1);
    /// assert_eq!(ids.next_id().as_u128(), 2);
    /// ```
    #[derive(Debug, Default)]
    pub struct SequentialIds {
        issued: AtomicU64,
    }

    impl SequentialIds {
        /// Start numbering at 1
        #[must_use]
        pub const fn new() -> Self {
            Self {
                issued: AtomicU64::new(0),
            }
        }

        /// Continue numbering after `issued`
        #[must_use]
        pub const fn starting_after(issued: u64) -> Self {
            Self {
                issued: AtomicU64::new(issued),
            }
        }

        /// The id the `n`-th call (1-based) returns
        #[must_use]
        pub const fn nth(n: u64) -> Uuid {
            Uuid::from_u128(n as u128)
        }
    }

    impl IdGenerator for SequentialIds {
        fn next_id(&self) -> Uuid {
            let n = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
            Self::nth(n)
        }
    }

    /// Storage whose reads and writes can be made to fail
    ///
    /// Wraps a [`MemoryStorage`]; failures can be toggled at any time to
    /// simulate storage that disappears or fills up mid-session.
    ///
    /// # Example
    ///
    /// ```
    /// use reducible_core::storage::Storage;
    /// use reducible_testing::mocks::FailingStorage;
    ///
    /// let storage = FailingStorage::new().failing_writes();
    /// assert!(storage.set("k", "v").is_err());
    /// assert_eq!(storage.write_attempts(), 1);
    ///
    /// storage.set_fail_writes(false);
    /// assert!(storage.set("k", "v").is_ok());
    /// ```
    #[derive(Debug, Default)]
    pub struct FailingStorage {
        inner: MemoryStorage,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
        write_attempts: AtomicUsize,
    }

    impl FailingStorage {
        /// Storage that works until told otherwise
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populate a slot in the wrapped storage
        #[must_use]
        pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
            self.inner = self.inner.with_entry(key, value);
            self
        }

        /// Make every read fail
        #[must_use]
        pub fn failing_reads(self) -> Self {
            self.set_fail_reads(true);
            self
        }

        /// Make every write fail
        #[must_use]
        pub fn failing_writes(self) -> Self {
            self.set_fail_writes(true);
            self
        }

        /// Toggle read failures
        pub fn set_fail_reads(&self, fail: bool) {
            self.fail_reads.store(fail, Ordering::SeqCst);
        }

        /// Toggle write failures
        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Number of `set` calls, successful or not
        #[must_use]
        pub fn write_attempts(&self) -> usize {
            self.write_attempts.load(Ordering::SeqCst)
        }

        /// Read the wrapped storage directly, bypassing read failures
        #[must_use]
        pub fn peek(&self, key: &str) -> Option<String> {
            self.inner.get(key).ok().flatten()
        }
    }

    impl Storage for FailingStorage {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::AccessDenied("reads disabled".to_string()));
            }
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.write_attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::QuotaExceeded);
            }
            self.inner.set(key, value)
        }
    }

    /// Create a fresh sequential id generator for tests
    #[must_use]
    pub const fn test_ids() -> SequentialIds {
        SequentialIds::new()
    }
}

/// Install a `tracing` subscriber that writes through the test harness
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .try_init();
}

// Re-export commonly used items
pub use mocks::{FailingStorage, SequentialIds, test_ids};
