//! The list reducer.
//!
//! A pure transition `(&TodoList, ListCommand) -> TodoList`. Every command
//! builds a new list; the input is left as it was. Commands that name an id
//! that is not in the list return an equal list, which guards against a UI
//! action racing a deletion.

use crate::types::{TodoId, TodoItem, TodoList};
use reducible_core::environment::{IdGenerator, UuidGenerator};
use reducible_core::reducer::Reducer;
use reducible_macros::Action;
use std::sync::Arc;

/// Environment dependencies for the todo reducers
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of ids for new items
    pub ids: Arc<dyn IdGenerator>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// Environment backed by random UUIDs
    #[must_use]
    pub fn production() -> Self {
        Self::new(Arc::new(UuidGenerator))
    }

    /// Draws an id that is not used in `list`
    ///
    /// A deterministic generator may hand out an id that a restored list
    /// already holds; such ids are skipped.
    fn fresh_id(&self, list: &TodoList) -> TodoId {
        loop {
            let id = TodoId::from_uuid(self.ids.next_id());
            if !list.contains(id) {
                return id;
            }
        }
    }
}

impl std::fmt::Debug for TodoEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoEnvironment").finish_non_exhaustive()
    }
}

/// Commands accepted by the list reducer
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum ListCommand {
    /// Append a new item at the end of the list
    ///
    /// The text must already be trimmed and non-empty.
    Add {
        /// Text of the new item
        text: String,
    },

    /// Flip the completed flag of an item
    Toggle {
        /// Item to toggle
        id: TodoId,
    },

    /// Remove an item
    Clear {
        /// Item to remove
        id: TodoId,
    },

    /// Remove every completed item
    ClearAllCompleted,

    /// Move the item at `source` so it ends up at `destination`
    ///
    /// Both are absolute positions in the full list and must be in range.
    Reorder {
        /// Current position of the item
        source: usize,
        /// Position after the move
        destination: usize,
    },

    /// Replace the text of an item
    ///
    /// The text must already be trimmed and non-empty.
    Edit {
        /// Item to edit
        id: TodoId,
        /// New text
        text: String,
    },
}

/// Reducer for the ordered todo list
#[derive(Clone, Copy, Debug, Default)]
pub struct ListReducer;

impl ListReducer {
    /// Creates a new `ListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Copy of `list` with the item `id` replaced by `f(item)`
    fn replace(list: &TodoList, id: TodoId, f: impl FnOnce(&TodoItem) -> TodoItem) -> TodoList {
        let Some(position) = list.position(id) else {
            return list.clone();
        };

        let mut items = list.items().to_vec();
        items[position] = f(&items[position]);
        TodoList::from_unique(items)
    }

    /// Copy of `list` keeping only the items for which `keep` is true
    fn retain(list: &TodoList, keep: impl Fn(&TodoItem) -> bool) -> TodoList {
        TodoList::from_unique(list.iter().filter(|item| keep(item)).cloned().collect())
    }

    /// Copy of `list` with the item at `source` moved to `destination`
    fn reorder(list: &TodoList, source: usize, destination: usize) -> TodoList {
        let len = list.len();
        debug_assert!(
            source < len && destination < len,
            "reorder {source} -> {destination} out of range for {len} items"
        );

        if source >= len || destination >= len {
            tracing::error!(source, destination, len, "Reorder out of range, list left unchanged");
            return list.clone();
        }

        let mut items = list.items().to_vec();
        let item = items.remove(source);
        items.insert(destination, item);
        TodoList::from_unique(items)
    }
}

impl Reducer for ListReducer {
    type State = TodoList;
    type Action = ListCommand;
    type Environment = TodoEnvironment;

    fn reduce(&self, list: &TodoList, command: ListCommand, env: &TodoEnvironment) -> TodoList {
        match command {
            ListCommand::Add { text } => {
                let mut items = list.items().to_vec();
                items.push(TodoItem::new(env.fresh_id(list), text));
                TodoList::from_unique(items)
            },
            ListCommand::Toggle { id } => Self::replace(list, id, TodoItem::toggled),
            ListCommand::Clear { id } => Self::retain(list, |item| item.id != id),
            ListCommand::ClearAllCompleted => Self::retain(list, |item| !item.completed),
            ListCommand::Reorder {
                source,
                destination,
            } => Self::reorder(list, source, destination),
            ListCommand::Edit { id, text } => Self::replace(list, id, |item| item.with_text(text)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reducible_testing::{ReducerTest, SequentialIds, test_ids};

    fn env() -> TodoEnvironment {
        TodoEnvironment::new(Arc::new(test_ids()))
    }

    fn id(n: u64) -> TodoId {
        TodoId::from_uuid(SequentialIds::nth(n))
    }

    /// List with items 1..=n, texts "item 1".."item n", none completed
    fn list_of(n: u64) -> TodoList {
        TodoList::from_unique(
            (1..=n)
                .map(|i| TodoItem::new(id(i), format!("item {i}")))
                .collect(),
        )
    }

    fn ids(list: &TodoList) -> Vec<TodoId> {
        list.iter().map(|item| item.id).collect()
    }

    #[test]
    fn test_add_appends_at_tail() {
        ReducerTest::new(ListReducer::new())
            .with_env(TodoEnvironment::new(Arc::new(SequentialIds::starting_after(10))))
            .given_state(list_of(2))
            .when_action(ListCommand::Add {
                text: "buy milk".to_string(),
            })
            .then_state(|list| {
                assert_eq!(list.len(), 3);
                assert_eq!(ids(list), vec![id(1), id(2), id(11)]);
                let added = &list.items()[2];
                assert_eq!(added.text, "buy milk");
                assert!(!added.completed);
            })
            .then_transition(|before, _| {
                assert_eq!(before.len(), 2);
            })
            .run();
    }

    #[test]
    fn test_add_skips_ids_already_in_list() {
        // The generator starts at 1, which the seeded list already uses.
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(2))
            .when_action(ListCommand::Add {
                text: "new".to_string(),
            })
            .then_state(|list| {
                assert_eq!(list.items()[2].id, id(3));
            })
            .run();
    }

    #[test]
    fn test_toggle_flips_only_matching_item() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(3))
            .when_action(ListCommand::Toggle { id: id(2) })
            .then_transition(|before, after| {
                assert_eq!(after.len(), 3);
                assert_eq!(after.items()[1], before.items()[1].toggled());
                assert_eq!(after.items()[0], before.items()[0]);
                assert_eq!(after.items()[2], before.items()[2]);
            })
            .run();
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(3))
            .when_action(ListCommand::Toggle { id: id(99) })
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_clear_removes_matching_item() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(3))
            .when_action(ListCommand::Clear { id: id(2) })
            .then_state(|list| {
                assert_eq!(ids(list), vec![id(1), id(3)]);
            })
            .run();
    }

    #[test]
    fn test_clear_unknown_id_is_noop() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(3))
            .when_action(ListCommand::Clear { id: id(42) })
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_clear_all_completed() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(4))
            .when_action(ListCommand::Toggle { id: id(1) })
            .when_action(ListCommand::Toggle { id: id(3) })
            .when_action(ListCommand::ClearAllCompleted)
            .then_state(|list| {
                assert_eq!(ids(list), vec![id(2), id(4)]);
                assert_eq!(list.completed_count(), 0);
            })
            .run();
    }

    #[test]
    fn test_clear_all_completed_without_completed_is_noop() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(3))
            .when_action(ListCommand::ClearAllCompleted)
            .then_unchanged()
            .run();
    }

    #[test]
    fn test_reorder_last_to_first() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(3))
            .when_action(ListCommand::Reorder {
                source: 2,
                destination: 0,
            })
            .then_state(|list| {
                assert_eq!(ids(list), vec![id(3), id(1), id(2)]);
            })
            .run();
    }

    #[test]
    fn test_reorder_first_to_last() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(3))
            .when_action(ListCommand::Reorder {
                source: 0,
                destination: 2,
            })
            .then_state(|list| {
                assert_eq!(ids(list), vec![id(2), id(3), id(1)]);
            })
            .run();
    }

    #[test]
    fn test_reorder_same_index_is_noop() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(3))
            .when_action(ListCommand::Reorder {
                source: 1,
                destination: 1,
            })
            .then_unchanged()
            .run();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn test_reorder_out_of_range_aborts_in_debug() {
        let _ = ListReducer::new().reduce(
            &list_of(2),
            ListCommand::Reorder {
                source: 0,
                destination: 5,
            },
            &env(),
        );
    }

    #[test]
    fn test_edit_replaces_text_in_place() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(3))
            .when_action(ListCommand::Toggle { id: id(2) })
            .when_action(ListCommand::Edit {
                id: id(2),
                text: "renamed".to_string(),
            })
            .then_state(|list| {
                let item = &list.items()[1];
                assert_eq!(item.id, id(2));
                assert_eq!(item.text, "renamed");
                assert!(item.completed);
            })
            .run();
    }

    #[test]
    fn test_edit_unknown_id_is_noop() {
        ReducerTest::new(ListReducer::new())
            .with_env(env())
            .given_state(list_of(2))
            .when_action(ListCommand::Edit {
                id: id(7),
                text: "ghost".to_string(),
            })
            .then_unchanged()
            .run();
    }
}
