//! # Reducible Core
//!
//! Core traits and types for reducer-driven state that survives restarts.
//!
//! This crate provides the fundamental abstractions for building small,
//! single-user applications around a pure state-transition function whose
//! results are written back to a key-value storage slot.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature, replaced wholesale on every transition
//! - **Action**: All possible inputs to a reducer (a closed enum)
//! - **Reducer**: Pure function `(&State, Action, &Environment) → State`
//! - **Persistent**: The part of a state that is written to storage
//! - **Environment**: Injected dependencies via traits (identifier generation)
//! - **Storage**: Key-value slot the runtime loads from and writes back to
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Copy-on-write transitions (the input state is never mutated)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```
//! use reducible_core::reducer::Reducer;
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! enum CounterAction {
//!     Increment,
//!     Reset,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &CounterState, action: CounterAction, _env: &()) -> CounterState {
//!         match action {
//!             CounterAction::Increment => CounterState { count: state.count + 1 },
//!             CounterAction::Reset => CounterState::default(),
//!         }
//!     }
//! }
//!
//! let before = CounterState::default();
//! let after = CounterReducer.reduce(&before, CounterAction::Increment, &());
//! assert_eq!(before.count, 0);
//! assert_eq!(after.count, 1);
//! ```

// Re-export commonly used types
pub use serde::{Deserialize, Serialize};
pub use uuid::Uuid;

/// JSON encoding of persisted snapshots
pub mod codec;

/// Key-value storage abstraction
pub mod storage;

/// Action module - Unified input type for reducers
///
/// Actions represent all possible state transitions of a feature. They are
/// closed enums: a reducer matches them exhaustively, so an "unknown action"
/// cannot reach it.
pub mod action {
    /// Common behavior the runtime needs from an action
    ///
    /// Usually derived with `#[derive(Action)]` from `reducible-macros`.
    ///
    /// # Example
    ///
    /// ```
    /// use reducible_core::action::Action;
    ///
    /// enum ViewAction {
    ///     Rename(String),
    ///     Scroll(u32),
    /// }
    ///
    /// impl Action for ViewAction {
    ///     fn name(&self) -> &'static str {
    ///         match self {
    ///             Self::Rename(_) => "Rename",
    ///             Self::Scroll(_) => "Scroll",
    ///         }
    ///     }
    ///
    ///     fn is_transient(&self) -> bool {
    ///         matches!(self, Self::Scroll(_))
    ///     }
    /// }
    ///
    /// assert!(ViewAction::Scroll(3).is_transient());
    /// assert_eq!(ViewAction::Rename("a".into()).name(), "Rename");
    /// ```
    pub trait Action {
        /// Variant name, used for logging and metrics labels
        fn name(&self) -> &'static str;

        /// Returns true if this action only touches state that is never persisted
        ///
        /// The runtime skips the storage write-back for transient actions.
        fn is_transient(&self) -> bool {
            false
        }
    }
}

/// State module - Persisted projection of a state
///
/// A state may carry transient, view-only fields next to the data that must
/// survive a restart. [`state::Persistent`] names the persisted part.
pub mod state {
    use serde::{Serialize, de::DeserializeOwned};

    /// The slice of a state that is written to storage
    ///
    /// Usually derived with `#[derive(State)]` and a `#[persist]` field.
    ///
    /// # Example
    ///
    /// ```
    /// use reducible_core::state::Persistent;
    ///
    /// #[derive(Default)]
    /// struct Notes {
    ///     entries: Vec<String>,
    ///     cursor: usize,
    /// }
    ///
    /// impl Persistent for Notes {
    ///     type Snapshot = Vec<String>;
    ///
    ///     fn snapshot(&self) -> &Vec<String> {
    ///         &self.entries
    ///     }
    ///
    ///     fn restore(&mut self, snapshot: Vec<String>) {
    ///         self.entries = snapshot;
    ///     }
    /// }
    ///
    /// let mut notes = Notes::default();
    /// notes.restore(vec!["hello".to_string()]);
    /// assert_eq!(notes.snapshot().len(), 1);
    /// assert_eq!(notes.cursor, 0);
    /// ```
    pub trait Persistent {
        /// Serialized form of the persisted part
        type Snapshot: Serialize + DeserializeOwned;

        /// Borrow the persisted part
        fn snapshot(&self) -> &Self::Snapshot;

        /// Replace the persisted part with a snapshot loaded from storage
        fn restore(&mut self, snapshot: Self::Snapshot);
    }
}

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(&State, Action, &Environment) → State`
///
/// They contain all business logic and are deterministic given identical
/// injected dependencies.
pub mod reducer {
    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Copy-on-write
    ///
    /// `reduce` borrows the current state immutably and returns the next
    /// state. The input is never modified in place, so a caller holding the
    /// previous state (an observer, a test) always sees a consistent value.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into the next state
        ///
        /// # Arguments
        ///
        /// - `state`: The current state
        /// - `action`: The action to process
        /// - `env`: Reference to injected dependencies
        ///
        /// # Returns
        ///
        /// The next state
        fn reduce(
            &self,
            state: &Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> Self::State;
    }
}

/// Environment module - Dependency injection traits
///
/// All non-deterministic inputs of a reducer are abstracted behind traits
/// and injected via the Environment parameter.
pub mod environment {
    use uuid::Uuid;

    /// Identifier generator - abstracts id creation for testability
    ///
    /// Only uniqueness within the session's id space is required; no ordering
    /// guarantee is implied.
    ///
    /// # Examples
    ///
    /// ```
    /// use reducible_core::environment::{IdGenerator, UuidGenerator};
    ///
    /// let ids = UuidGenerator;
    /// assert_ne!(ids.next_id(), ids.next_id());
    /// ```
    pub trait IdGenerator: Send + Sync {
        /// Produce a new identifier
        fn next_id(&self) -> Uuid;
    }

    /// Production id generator backed by random (v4) UUIDs
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidGenerator;

    impl IdGenerator for UuidGenerator {
        fn next_id(&self) -> Uuid {
            Uuid::new_v4()
        }
    }
}
