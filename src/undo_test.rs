#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::object::{ObjectKind, PartialBoardObject};
use crate::persist::NullSink;

fn make_store() -> ObjectStore<NullSink> {
    ObjectStore::new(NullSink)
}

fn make_object(text: &str) -> BoardObject {
    BoardObject::new(ObjectKind::Sticky, 0.0, 0.0, 100.0, 100.0, json!({"text": text}), 0)
}

// =============================================================
// Create / delete inverses
// =============================================================

#[test]
fn n_creates_undone_restore_pre_creation_state() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();

    let mut ids = Vec::new();
    for i in 0..3 {
        let obj = make_object(&format!("note {i}"));
        let id = store.create(obj);
        undo.record(UndoOp::Remove(id));
        ids.push(id);
    }
    assert_eq!(store.len(), 3);

    for _ in 0..3 {
        assert!(undo.undo(&mut store, 1_000));
    }
    assert!(store.is_empty());

    // Redo restores all three with their original fields.
    for _ in 0..3 {
        assert!(undo.redo(&mut store, 2_000));
    }
    assert_eq!(store.len(), 3);
    for (i, id) in ids.iter().enumerate() {
        let obj = store.get(id).unwrap();
        assert_eq!(obj.props["text"], format!("note {i}"));
    }
}

#[test]
fn delete_undo_recreates_original_object() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();

    let id = store.create(make_object("keep me"));
    let prior = store.delete(&id).unwrap();
    undo.record(UndoOp::Recreate(prior));
    assert!(!store.contains(&id));

    assert!(undo.undo(&mut store, 1_000));
    let obj = store.get(&id).unwrap();
    assert_eq!(obj.props["text"], "keep me");

    assert!(undo.redo(&mut store, 2_000));
    assert!(!store.contains(&id));
}

// =============================================================
// Update inverse
// =============================================================

#[test]
fn restore_round_trips_through_redo() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();

    let id = store.create(make_object("v1"));
    let prior = store.get(&id).unwrap().clone();
    store.update(&id, &PartialBoardObject::position(50.0, 60.0), 500);
    undo.record(UndoOp::Restore(prior));

    assert!(undo.undo(&mut store, 1_000));
    assert_eq!(store.get(&id).unwrap().x, 0.0);

    assert!(undo.redo(&mut store, 2_000));
    assert_eq!(store.get(&id).unwrap().x, 50.0);
}

#[test]
fn restore_replaces_props_and_frame_reference_wholesale() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();

    let id = store.create(BoardObject::new(ObjectKind::Frame, 0.0, 0.0, 400.0, 300.0, json!({"title": "F"}), 0));
    let prior = store.get(&id).unwrap().clone();
    let fields = PartialBoardObject {
        parent_frame_id: Some(uuid::Uuid::new_v4()),
        props: Some(json!({"color": "#FF0000"})),
        ..PartialBoardObject::default()
    };
    store.update(&id, &fields, 500);
    undo.record(UndoOp::Restore(prior));

    // The added props key and the frame assignment must not survive undo.
    assert!(undo.undo(&mut store, 1_000));
    let obj = store.get(&id).unwrap();
    assert!(obj.props.get("color").is_none());
    assert_eq!(obj.props["title"], "F");
    assert!(obj.parent_frame_id.is_none());

    assert!(undo.redo(&mut store, 2_000));
    let obj = store.get(&id).unwrap();
    assert_eq!(obj.props["color"], "#FF0000");
    assert!(obj.parent_frame_id.is_some());
}

#[test]
fn restore_of_vanished_object_recreates_it() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();

    let id = store.create(make_object("v1"));
    let prior = store.get(&id).unwrap().clone();
    store.update(&id, &PartialBoardObject::position(9.0, 9.0), 500);
    undo.record(UndoOp::Restore(prior));

    // Another client deleted it in the meantime.
    store.delete(&id);
    assert!(undo.undo(&mut store, 1_000));
    assert_eq!(store.get(&id).unwrap().x, 0.0);
}

// =============================================================
// Batch atomicity
// =============================================================

#[test]
fn batch_descriptor_reverses_as_one_unit() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();

    let a = store.create(make_object("a"));
    let b = store.create(make_object("b"));
    undo.record(UndoOp::Batch(vec![UndoOp::Remove(a), UndoOp::Remove(b)]));

    assert!(undo.undo(&mut store, 1_000));
    assert!(store.is_empty());

    assert!(undo.redo(&mut store, 2_000));
    assert!(store.contains(&a));
    assert!(store.contains(&b));
}

#[test]
fn batch_unwinds_same_object_ops_in_reverse() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();

    let id = store.create(make_object("new"));
    let prior = store.get(&id).unwrap().clone();
    store.update(&id, &PartialBoardObject::position(300.0, 0.0), 500);
    undo.record(UndoOp::Batch(vec![UndoOp::Remove(id), UndoOp::Restore(prior)]));

    // The update unwinds before the create, not after it: restoring last
    // would resurrect the object the batch just removed.
    assert!(undo.undo(&mut store, 1_000));
    assert!(store.is_empty());

    assert!(undo.redo(&mut store, 2_000));
    assert_eq!(store.get(&id).unwrap().x, 300.0);
}

// =============================================================
// Linear model and bounds
// =============================================================

#[test]
fn new_mutation_clears_redo() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();

    let id = store.create(make_object("a"));
    undo.record(UndoOp::Remove(id));
    undo.undo(&mut store, 1_000);
    assert!(undo.can_redo());

    let other = store.create(make_object("b"));
    undo.record(UndoOp::Remove(other));
    assert!(!undo.can_redo());
}

#[test]
fn undo_depth_is_bounded() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();
    for _ in 0..150 {
        let id = store.create(make_object("x"));
        undo.record(UndoOp::Remove(id));
    }
    assert_eq!(undo.depth(), 100);
}

#[test]
fn undo_redo_on_empty_stacks_do_nothing() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();
    assert!(!undo.undo(&mut store, 0));
    assert!(!undo.redo(&mut store, 0));
    assert!(!undo.can_undo());
}

#[test]
fn undoing_remotely_deleted_create_is_a_noop() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();
    let id = store.create(make_object("gone"));
    undo.record(UndoOp::Remove(id));

    // The object disappears before undo runs.
    store.delete(&id);
    assert!(undo.undo(&mut store, 1_000));
    assert!(!store.contains(&id));
    // Redoing the no-op doesn't resurrect anything.
    assert!(undo.redo(&mut store, 2_000));
    assert!(!store.contains(&id));
}
