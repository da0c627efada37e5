//! The UI-facing state holder and its reducer.
//!
//! A [`Session`] owns the persisted list plus the transient view state: the
//! active filter and the status announcement of the last transition (the
//! text a screen reader would narrate). [`SessionReducer`] validates input
//! coming from the UI, translates filtered positions into list positions,
//! and delegates the list change to [`ListReducer`].

use crate::list::{ListCommand, ListReducer, TodoEnvironment};
use crate::types::{Filter, TodoId, TodoItem, TodoList};
use reducible_core::action::Action as _;
use reducible_core::reducer::Reducer;
use reducible_macros::{Action, State};

/// State of one to-do session
#[derive(State, Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    #[persist]
    list: TodoList,
    filter: Filter,
    announcement: Option<String>,
}

impl Session {
    /// Creates an empty session showing every item
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session seeded with `list`
    #[must_use]
    pub fn with_list(list: TodoList) -> Self {
        Self {
            list,
            ..Self::default()
        }
    }

    /// The full list, in order
    #[must_use]
    pub const fn list(&self) -> &TodoList {
        &self.list
    }

    /// The active filter
    #[must_use]
    pub const fn filter(&self) -> Filter {
        self.filter
    }

    /// What the last transition did, if anything worth announcing
    #[must_use]
    pub fn announcement(&self) -> Option<&str> {
        self.announcement.as_deref()
    }

    /// Items shown under the active filter, in list order
    pub fn visible(&self) -> impl Iterator<Item = &TodoItem> + '_ {
        let filter = self.filter;
        self.list.iter().filter(move |item| filter.matches(item))
    }

    /// The `index`-th visible item
    #[must_use]
    pub fn visible_item(&self, index: usize) -> Option<&TodoItem> {
        self.visible().nth(index)
    }

    /// Returns the number of items not yet completed
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.list.active_count()
    }

    /// Footer text such as `"1 item left"` or `"3 items left"`
    #[must_use]
    pub fn items_left(&self) -> String {
        let count = self.active_count();
        let plural = if count == 1 { "" } else { "s" };
        format!("{count} item{plural} left")
    }

    fn transition(&self, list: TodoList, announcement: Option<String>) -> Self {
        Self {
            list,
            filter: self.filter,
            announcement,
        }
    }

    fn unchanged(&self) -> Self {
        self.transition(self.list.clone(), None)
    }
}

/// Actions emitted by the UI
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// Create an item from raw input; blank input is ignored
    Add {
        /// Text as typed
        text: String,
    },

    /// Complete or reactivate an item
    Toggle {
        /// Item to toggle
        id: TodoId,
    },

    /// Delete an item
    Clear {
        /// Item to delete
        id: TodoId,
    },

    /// Delete every completed item
    ClearAllCompleted,

    /// Rename an item from raw input; blank input is ignored
    Edit {
        /// Item to rename
        id: TodoId,
        /// Text as typed
        text: String,
    },

    /// Drag result: positions are in the filtered view
    Move {
        /// Visible position the item was dragged from
        from: usize,
        /// Visible position it was dropped at
        to: usize,
    },

    /// Change the displayed subset
    #[transient]
    SetFilter(Filter),
}

/// Translates a move between filtered positions into list positions
///
/// `from` becomes the list position of the `from`-th visible item and `to`
/// the list position of the `to`-th visible item. Reordering the list with
/// these positions moves the item among the visible ones and leaves hidden
/// items in their relative order.
///
/// Returns `None` if either position is outside the filtered view.
///
/// # Example
///
/// ```
/// use todo::{Filter, resolve_move};
/// # use todo::TodoList;
/// # let list = TodoList::new();
/// // With an empty list nothing can be moved.
/// assert_eq!(resolve_move(&list, Filter::Active, 0, 1), None);
/// ```
#[must_use]
pub fn resolve_move(list: &TodoList, filter: Filter, from: usize, to: usize) -> Option<(usize, usize)> {
    let positions: Vec<usize> = list
        .iter()
        .enumerate()
        .filter(|(_, item)| filter.matches(item))
        .map(|(position, _)| position)
        .collect();

    Some((*positions.get(from)?, *positions.get(to)?))
}

/// Reducer for a to-do session
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionReducer {
    list: ListReducer,
}

impl SessionReducer {
    /// Creates a new `SessionReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self {
            list: ListReducer::new(),
        }
    }

    fn apply(&self, state: &Session, command: ListCommand, env: &TodoEnvironment) -> TodoList {
        tracing::trace!(command = command.name(), "Applying list command");
        self.list.reduce(&state.list, command, env)
    }

    /// Trimmed input, or `None` if nothing is left
    fn accept(text: &str) -> Option<&str> {
        let text = text.trim();
        (!text.is_empty()).then_some(text)
    }
}

impl Reducer for SessionReducer {
    type State = Session;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(&self, state: &Session, action: TodoAction, env: &TodoEnvironment) -> Session {
        match action {
            TodoAction::Add { text } => {
                let Some(text) = Self::accept(&text) else {
                    tracing::debug!("Ignoring blank todo");
                    return state.unchanged();
                };

                let list = self.apply(
                    state,
                    ListCommand::Add {
                        text: text.to_string(),
                    },
                    env,
                );
                state.transition(list, Some(format!("\"{text}\" was added")))
            },

            TodoAction::Toggle { id } => {
                let Some(item) = state.list.get(id) else {
                    tracing::debug!(%id, "Toggle for unknown todo");
                    return state.unchanged();
                };

                let announcement = if item.completed {
                    format!("\"{}\" was marked as active", item.text)
                } else {
                    format!("\"{}\" was marked as completed", item.text)
                };
                let list = self.apply(state, ListCommand::Toggle { id }, env);
                state.transition(list, Some(announcement))
            },

            TodoAction::Clear { id } => {
                let Some(item) = state.list.get(id) else {
                    tracing::debug!(%id, "Clear for unknown todo");
                    return state.unchanged();
                };

                let announcement = format!("\"{}\" was removed", item.text);
                let list = self.apply(state, ListCommand::Clear { id }, env);
                state.transition(list, Some(announcement))
            },

            TodoAction::ClearAllCompleted => {
                let list = self.apply(state, ListCommand::ClearAllCompleted, env);
                state.transition(list, Some("All completed todos were removed".to_string()))
            },

            TodoAction::Edit { id, text } => {
                let Some(text) = Self::accept(&text) else {
                    tracing::debug!(%id, "Ignoring blank rename");
                    return state.unchanged();
                };
                let Some(item) = state.list.get(id) else {
                    tracing::debug!(%id, "Edit for unknown todo");
                    return state.unchanged();
                };

                let announcement = format!("\"{}\" was renamed to \"{text}\"", item.text);
                let list = self.apply(
                    state,
                    ListCommand::Edit {
                        id,
                        text: text.to_string(),
                    },
                    env,
                );
                state.transition(list, Some(announcement))
            },

            TodoAction::Move { from, to } => {
                let Some((source, destination)) = resolve_move(&state.list, state.filter, from, to)
                else {
                    tracing::warn!(from, to, filter = %state.filter, "Move outside the visible list ignored");
                    return state.unchanged();
                };
                if source == destination {
                    return state.unchanged();
                }

                let announcement = format!("\"{}\" was moved", state.list.items()[source].text);
                let list = self.apply(
                    state,
                    ListCommand::Reorder {
                        source,
                        destination,
                    },
                    env,
                );
                state.transition(list, Some(announcement))
            },

            TodoAction::SetFilter(filter) => Session {
                list: state.list.clone(),
                filter,
                announcement: None,
            },
        }
    }
}
