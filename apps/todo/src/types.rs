//! Domain types for the to-do list.
//!
//! A list is an ordered sequence of items. Order is meaningful: it is both
//! the creation order and the result of user reordering, and nothing in this
//! crate ever sorts it. The persisted form is a JSON array:
//!
//! ```text
//! [{ "id": "<uuid>", "value": "<text>", "isCompleted": false }, ...]
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a `TodoId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier, assigned at creation
    pub id: TodoId,
    /// Text of the todo
    #[serde(rename = "value")]
    pub text: String,
    /// Whether the todo is completed
    #[serde(rename = "isCompleted")]
    pub completed: bool,
}

impl TodoItem {
    /// Creates a new, not yet completed item
    #[must_use]
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// Copy of this item with the completed flag flipped
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copy of this item with new text
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

/// A list whose items do not have unique ids
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Duplicate todo id {0}")]
pub struct DuplicateId(pub TodoId);

/// Ordered collection of todo items with unique ids
///
/// The only ways to build one are from items that pass the uniqueness check
/// and through the list reducer, which keeps it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TodoList(Vec<TodoItem>);

impl TodoList {
    /// Creates an empty list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Wraps items already known to have unique ids
    pub(crate) const fn from_unique(items: Vec<TodoItem>) -> Self {
        Self(items)
    }

    /// Items in list order
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.0
    }

    /// Iterates over items in list order
    pub fn iter(&self) -> std::slice::Iter<'_, TodoItem> {
        self.0.iter()
    }

    /// Returns the number of items
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the list has no items
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an item by ID
    #[must_use]
    pub fn get(&self, id: TodoId) -> Option<&TodoItem> {
        self.0.iter().find(|item| item.id == id)
    }

    /// Returns the position of an item by ID
    #[must_use]
    pub fn position(&self, id: TodoId) -> Option<usize> {
        self.0.iter().position(|item| item.id == id)
    }

    /// Checks if an item exists
    #[must_use]
    pub fn contains(&self, id: TodoId) -> bool {
        self.position(id).is_some()
    }

    /// Returns the number of items not yet completed
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.0.iter().filter(|item| !item.completed).count()
    }

    /// Returns the number of completed items
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.0.iter().filter(|item| item.completed).count()
    }
}

impl TryFrom<Vec<TodoItem>> for TodoList {
    type Error = DuplicateId;

    fn try_from(items: Vec<TodoItem>) -> Result<Self, Self::Error> {
        let mut seen = HashSet::with_capacity(items.len());
        if let Some(duplicate) = items.iter().find(|item| !seen.insert(item.id)) {
            return Err(DuplicateId(duplicate.id));
        }
        Ok(Self(items))
    }
}

impl<'de> Deserialize<'de> for TodoList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<TodoItem>::deserialize(deserializer)?;
        Self::try_from(items).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a TodoList {
    type Item = &'a TodoItem;
    type IntoIter = std::slice::Iter<'a, TodoItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Which subset of the list is shown
///
/// The filter never changes the list itself. It selects the displayed
/// items, and the items move indices refer to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    /// Every item
    #[default]
    All,
    /// Items not yet completed
    Active,
    /// Completed items
    Completed,
}

impl Filter {
    /// All filters, in display order
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Returns true if `item` is shown under this filter
    #[must_use]
    pub const fn matches(self, item: &TodoItem) -> bool {
        match self {
            Self::All => true,
            Self::Active => !item.completed,
            Self::Completed => item.completed,
        }
    }

    /// Lowercase name, as accepted by `FromStr`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    /// Capitalized name for display
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown filter name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown filter {0:?} (expected all, active or completed)")]
pub struct ParseFilterError(String);

impl FromStr for Filter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFilterError(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    fn id(n: u128) -> TodoId {
        TodoId::from_uuid(Uuid::from_u128(n))
    }

    #[test]
    fn todo_item_new() {
        let item = TodoItem::new(id(1), "Test todo");

        assert_eq!(item.id, id(1));
        assert_eq!(item.text, "Test todo");
        assert!(!item.completed);
    }

    #[test]
    fn toggled_flips_only_the_flag() {
        let item = TodoItem::new(id(1), "Test");
        let toggled = item.toggled();

        assert!(toggled.completed);
        assert_eq!(toggled.id, item.id);
        assert_eq!(toggled.text, item.text);
        assert!(!item.completed);
        assert_eq!(toggled.toggled(), item);
    }

    #[test]
    fn wire_format_uses_original_field_names() {
        let item = TodoItem::new(id(1), "buy milk");
        let json = serde_json::to_value(&item).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": "00000000-0000-0000-0000-000000000001",
                "value": "buy milk",
                "isCompleted": false,
            })
        );
    }

    #[test]
    fn list_serializes_as_plain_array() {
        let list = TodoList::try_from(vec![TodoItem::new(id(1), "a")]).unwrap();
        let json = serde_json::to_string(&list).unwrap();
        assert!(json.starts_with('['));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let items = vec![TodoItem::new(id(1), "a"), TodoItem::new(id(1), "b")];
        assert_eq!(TodoList::try_from(items), Err(DuplicateId(id(1))));

        let json = r#"[
            {"id": "00000000-0000-0000-0000-000000000001", "value": "a", "isCompleted": false},
            {"id": "00000000-0000-0000-0000-000000000001", "value": "b", "isCompleted": true}
        ]"#;
        assert!(serde_json::from_str::<TodoList>(json).is_err());
    }

    #[test]
    fn list_counts() {
        let list = TodoList::try_from(vec![
            TodoItem::new(id(1), "a"),
            TodoItem::new(id(2), "b").toggled(),
            TodoItem::new(id(3), "c"),
        ])
        .unwrap();

        assert_eq!(list.len(), 3);
        assert_eq!(list.active_count(), 2);
        assert_eq!(list.completed_count(), 1);
        assert_eq!(list.position(id(3)), Some(2));
        assert!(!list.contains(id(4)));
    }

    #[test]
    fn filter_matches() {
        let active = TodoItem::new(id(1), "a");
        let done = active.toggled();

        assert!(Filter::All.matches(&active) && Filter::All.matches(&done));
        assert!(Filter::Active.matches(&active) && !Filter::Active.matches(&done));
        assert!(!Filter::Completed.matches(&active) && Filter::Completed.matches(&done));
    }

    #[test]
    fn filter_parses_case_insensitively() {
        assert_eq!("Active".parse::<Filter>(), Ok(Filter::Active));
        assert_eq!(" completed ".parse::<Filter>(), Ok(Filter::Completed));
        assert!("done".parse::<Filter>().is_err());
    }
}
