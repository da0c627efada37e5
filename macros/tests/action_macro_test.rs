//! Tests for #[derive(Action)] macro

use reducible_core::action::Action;
use reducible_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum NotesAction {
    Append { text: String },

    Remove(usize),

    Reset,

    #[transient]
    Select(usize),

    #[transient]
    ClearSelection,
}

#[derive(Action, Clone, Debug)]
enum Wrapped<T> {
    Push(T),

    #[transient]
    Peek,
}

#[test]
fn test_names_follow_variants() {
    assert_eq!(
        NotesAction::Append {
            text: "a".to_string()
        }
        .name(),
        "Append"
    );
    assert_eq!(NotesAction::Remove(0).name(), "Remove");
    assert_eq!(NotesAction::Reset.name(), "Reset");
    assert_eq!(NotesAction::Select(1).name(), "Select");
    assert_eq!(NotesAction::ClearSelection.name(), "ClearSelection");
}

#[test]
fn test_transient_marker() {
    assert!(NotesAction::Select(2).is_transient());
    assert!(NotesAction::ClearSelection.is_transient());
}

#[test]
fn test_unmarked_variants_are_persisted() {
    assert!(
        !NotesAction::Append {
            text: "a".to_string()
        }
        .is_transient()
    );
    assert!(!NotesAction::Remove(0).is_transient());
    assert!(!NotesAction::Reset.is_transient());
}

#[test]
fn test_generic_enum() {
    assert_eq!(Wrapped::Push(5_u8).name(), "Push");
    assert!(!Wrapped::Push(5_u8).is_transient());
    assert!(Wrapped::<u8>::Peek.is_transient());
}
