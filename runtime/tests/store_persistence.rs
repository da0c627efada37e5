//! Integration tests for Store loading, write-back, and subscriptions
//!
//! Uses a small notes feature: an append-only list that is persisted and a
//! selection that is not.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use reducible_core::environment::IdGenerator;
use reducible_core::reducer::Reducer;
use reducible_core::storage::Storage;
use reducible_core::Uuid;
use reducible_macros::{Action, State};
use reducible_runtime::{FileStorage, MemoryStorage, Store, StoreConfig, StoreError};
use reducible_testing::{FailingStorage, SequentialIds, init_test_tracing, test_ids};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::error::TryRecvError;

// ============================================================================
// Test Fixtures
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Note {
    id: Uuid,
    text: String,
}

#[derive(State, Clone, Debug, Default, PartialEq)]
struct NotesState {
    #[persist]
    notes: Vec<Note>,
    selected: Option<usize>,
}

#[derive(Action, Clone, Debug)]
enum NotesAction {
    Append(String),
    #[transient]
    Select(usize),
}

struct NotesReducer;

impl Reducer for NotesReducer {
    type State = NotesState;
    type Action = NotesAction;
    type Environment = SequentialIds;

    fn reduce(&self, state: &NotesState, action: NotesAction, env: &SequentialIds) -> NotesState {
        match action {
            NotesAction::Append(text) => {
                let mut notes = state.notes.clone();
                notes.push(Note {
                    id: env.next_id(),
                    text,
                });
                NotesState {
                    notes,
                    ..state.clone()
                }
            },
            NotesAction::Select(index) => NotesState {
                selected: Some(index),
                ..state.clone()
            },
        }
    }
}

type NotesStore = Store<NotesState, NotesAction, SequentialIds, NotesReducer>;

const KEY: &str = "notes";

fn notes_store(storage: Arc<dyn Storage>) -> NotesStore {
    init_test_tracing();
    Store::with_config(
        NotesState::default(),
        NotesReducer,
        test_ids(),
        storage,
        StoreConfig::new(KEY),
    )
}

fn stored_notes(text: &[&str]) -> String {
    let notes: Vec<Note> = text
        .iter()
        .enumerate()
        .map(|(i, t)| Note {
            id: SequentialIds::nth(100 + i as u64),
            text: (*t).to_string(),
        })
        .collect();
    serde_json::to_string(&notes).unwrap()
}

// ============================================================================
// Initialize
// ============================================================================

#[test]
fn empty_slot_starts_from_seed() {
    let store = notes_store(Arc::new(MemoryStorage::new()));
    assert_eq!(*store.snapshot(), NotesState::default());
}

#[test]
fn persisted_snapshot_is_restored_into_seed() {
    init_test_tracing();
    let storage = Arc::new(MemoryStorage::new().with_entry(KEY, stored_notes(&["a", "b"])));
    let seed = NotesState {
        notes: Vec::new(),
        selected: Some(7),
    };

    let store = Store::with_config(seed, NotesReducer, test_ids(), storage, StoreConfig::new(KEY));

    store.state(|s| {
        assert_eq!(s.notes.len(), 2);
        assert_eq!(s.notes[0].text, "a");
        assert_eq!(s.notes[1].text, "b");
        assert_eq!(s.selected, Some(7));
    });
}

#[test]
fn corrupt_snapshot_falls_back_to_seed() {
    let store = notes_store(Arc::new(MemoryStorage::new().with_entry(KEY, "[{\"id\": oops")));
    assert!(store.state(|s| s.notes.is_empty()));
}

#[test]
fn wrong_shape_falls_back_to_seed() {
    let store = notes_store(Arc::new(MemoryStorage::new().with_entry(KEY, r#"{"notes": 3}"#)));
    assert!(store.state(|s| s.notes.is_empty()));
}

#[test]
fn empty_blob_is_treated_as_missing() {
    let store = notes_store(Arc::new(MemoryStorage::new().with_entry(KEY, "")));
    assert!(store.state(|s| s.notes.is_empty()));
}

#[test]
fn unreadable_storage_falls_back_to_seed() {
    let storage = Arc::new(
        FailingStorage::new()
            .with_entry(KEY, stored_notes(&["hidden"]))
            .failing_reads(),
    );
    let store = notes_store(storage);
    assert!(store.state(|s| s.notes.is_empty()));
}

// ============================================================================
// Dispatch and write-back
// ============================================================================

#[test]
fn dispatch_writes_back_full_state() {
    let storage = Arc::new(MemoryStorage::new());
    let store = notes_store(storage.clone());

    store.dispatch(NotesAction::Append("first".to_string()));
    store.dispatch(NotesAction::Append("second".to_string()));

    let blob = storage.get(KEY).unwrap().expect("slot written");
    let saved: Vec<Note> = serde_json::from_str(&blob).unwrap();
    assert_eq!(saved, store.state(|s| s.notes.clone()));
    assert_eq!(saved[0].id, SequentialIds::nth(1));
    assert_eq!(saved[1].id, SequentialIds::nth(2));
}

#[test]
fn transient_actions_skip_write_back() {
    let storage = Arc::new(FailingStorage::new());
    let store = notes_store(storage.clone());

    store.dispatch(NotesAction::Select(3));

    assert_eq!(storage.write_attempts(), 0);
    assert_eq!(store.state(|s| s.selected), Some(3));
}

#[test]
fn write_failures_keep_in_memory_state() {
    let storage = Arc::new(FailingStorage::new().failing_writes());
    let store = notes_store(storage.clone());

    store.dispatch(NotesAction::Append("kept".to_string()));

    assert_eq!(storage.write_attempts(), 1);
    assert_eq!(storage.peek(KEY), None);
    assert_eq!(store.state(|s| s.notes.len()), 1);
}

#[test]
fn next_successful_write_supersedes_lost_one() {
    let storage = Arc::new(FailingStorage::new().failing_writes());
    let store = notes_store(storage.clone());

    store.dispatch(NotesAction::Append("lost".to_string()));
    storage.set_fail_writes(false);
    store.dispatch(NotesAction::Append("recovered".to_string()));

    let saved: Vec<Note> = serde_json::from_str(&storage.peek(KEY).unwrap()).unwrap();
    let text: Vec<_> = saved.iter().map(|n| n.text.as_str()).collect();
    assert_eq!(text, ["lost", "recovered"]);
}

#[test]
fn persist_now_reports_failures() {
    let storage = Arc::new(FailingStorage::new().failing_writes());
    let store = notes_store(storage);

    let err = store.persist_now().unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
}

#[test]
fn persist_now_writes_untouched_seed() {
    init_test_tracing();
    let storage = Arc::new(MemoryStorage::new());
    let seed = NotesState {
        notes: vec![Note {
            id: SequentialIds::nth(42),
            text: "seeded".to_string(),
        }],
        selected: None,
    };
    let store = Store::with_config(
        seed,
        NotesReducer,
        test_ids(),
        storage.clone(),
        StoreConfig::new(KEY),
    );

    store.persist_now().unwrap();

    assert!(storage.get(KEY).unwrap().unwrap().contains("seeded"));
}

#[test]
fn previous_snapshot_is_never_mutated() {
    let store = notes_store(Arc::new(MemoryStorage::new()));
    store.dispatch(NotesAction::Append("one".to_string()));
    let before = store.snapshot();

    store.dispatch(NotesAction::Append("two".to_string()));

    assert_eq!(before.notes.len(), 1);
    assert_eq!(store.snapshot().notes.len(), 2);
}

#[test]
fn file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = notes_store(Arc::new(FileStorage::new(dir.path())));
        store.dispatch(NotesAction::Append("durable".to_string()));
        store.dispatch(NotesAction::Select(0));
    }

    let reopened = notes_store(Arc::new(FileStorage::new(dir.path())));
    reopened.state(|s| {
        assert_eq!(s.notes.len(), 1);
        assert_eq!(s.notes[0].text, "durable");
        assert_eq!(s.selected, None);
    });
}

// ============================================================================
// Subscriptions
// ============================================================================

#[test]
fn subscribers_receive_each_snapshot_in_order() {
    let store = notes_store(Arc::new(MemoryStorage::new()));
    let mut updates = store.subscribe();

    store.dispatch(NotesAction::Append("a".to_string()));
    store.dispatch(NotesAction::Select(0));

    let first = updates.try_recv().unwrap();
    assert_eq!(first.notes.len(), 1);
    assert_eq!(first.selected, None);

    let second = updates.try_recv().unwrap();
    assert_eq!(second.selected, Some(0));

    assert!(matches!(updates.try_recv(), Err(TryRecvError::Empty)));
}

#[test]
fn dispatch_without_subscribers_is_fine() {
    let store = notes_store(Arc::new(MemoryStorage::new()));
    store.dispatch(NotesAction::Append("alone".to_string()));
    assert_eq!(store.state(|s| s.notes.len()), 1);
}

#[test]
fn lagging_subscriber_skips_to_buffered_snapshots() {
    init_test_tracing();
    let store = Store::with_config(
        NotesState::default(),
        NotesReducer,
        test_ids(),
        Arc::new(MemoryStorage::new()),
        StoreConfig::new(KEY).with_broadcast_capacity(2),
    );
    let mut updates = store.subscribe();

    for i in 0..5 {
        store.dispatch(NotesAction::Append(format!("n{i}")));
    }

    assert!(matches!(updates.try_recv(), Err(TryRecvError::Lagged(3))));
    assert_eq!(updates.try_recv().unwrap().notes.len(), 4);
    assert_eq!(updates.try_recv().unwrap().notes.len(), 5);
}

#[test]
fn store_reports_storage_key() {
    let store = notes_store(Arc::new(MemoryStorage::new()));
    assert_eq!(store.storage_key(), KEY);
}
