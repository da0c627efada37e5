//! To-do list built on Reducible.
//!
//! The crate has two layers:
//!
//! - [`ListReducer`]: pure transitions over an ordered [`TodoList`]
//!   (add, toggle, clear, clear completed, reorder, edit)
//! - [`SessionReducer`]: the UI-facing layer holding the filter and the
//!   status announcement; it validates raw input and translates moves in the
//!   filtered view into list positions
//!
//! A [`TodoStore`] wraps the session with durable storage: the list is loaded
//! at startup and written back after every change.
//!
//! # Quick Start
//!
//! ```
//! use reducible_runtime::MemoryStorage;
//! use std::sync::Arc;
//! use todo::{AppConfig, Session, TodoAction, TodoEnvironment, open_store};
//!
//! # fn main() -> Result<(), todo::ConfigError> {
//! let config = AppConfig::from_lookup(|name| {
//!     (name == "TODO_DATA_DIR").then(|| "/tmp/todo".to_string())
//! })?;
//! let store = open_store(
//!     Session::new(),
//!     TodoEnvironment::production(),
//!     Arc::new(MemoryStorage::new()),
//!     &config,
//! );
//!
//! store.dispatch(TodoAction::Add { text: "buy milk".to_string() });
//!
//! let left = store.state(Session::items_left);
//! assert_eq!(left, "1 item left");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod list;
pub mod session;
pub mod types;

use reducible_core::reducer::Reducer as _;
use reducible_core::storage::Storage;
use reducible_runtime::{Store, StoreConfig};
use std::sync::Arc;

// Re-export commonly used types
pub use config::{AppConfig, ConfigError};
pub use list::{ListCommand, ListReducer, TodoEnvironment};
pub use session::{Session, SessionReducer, TodoAction, resolve_move};
pub use types::{DuplicateId, Filter, ParseFilterError, TodoId, TodoItem, TodoList};

/// Store running a to-do session
pub type TodoStore = Store<Session, TodoAction, TodoEnvironment, SessionReducer>;

/// Open a store over the slot named by `config`
///
/// The persisted list replaces the list in `seed` when the slot holds a
/// valid one; otherwise `seed` is used as is.
#[must_use]
pub fn open_store(
    seed: Session,
    environment: TodoEnvironment,
    storage: Arc<dyn Storage>,
    config: &AppConfig,
) -> TodoStore {
    tracing::info!(key = %config.storage_key, "Opening todo store");
    Store::with_config(
        seed,
        SessionReducer::new(),
        environment,
        storage,
        StoreConfig::new(config.storage_key.clone()),
    )
}

/// A short sample list, with ids drawn from `environment`
#[must_use]
pub fn demo_list(environment: &TodoEnvironment) -> TodoList {
    let list = ["Buy milk", "Walk the dog", "Water the plants"]
        .into_iter()
        .fold(TodoList::new(), |list, text| {
            ListReducer::new().reduce(
                &list,
                ListCommand::Add {
                    text: text.to_string(),
                },
                environment,
            )
        });

    match list.items().first().map(|item| item.id) {
        Some(id) => ListReducer::new().reduce(&list, ListCommand::Toggle { id }, environment),
        None => list,
    }
}
