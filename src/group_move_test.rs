#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::persist::RecordingSink;
use crate::undo::UndoRedoStack;

fn make_store() -> ObjectStore<RecordingSink> {
    ObjectStore::new(RecordingSink::default())
}

fn add(store: &mut ObjectStore<RecordingSink>, kind: ObjectKind, x: f64, y: f64, w: f64, h: f64) -> ObjectId {
    store.create(BoardObject::new(kind, x, y, w, h, json!({}), 0))
}

// =============================================================
// Delta math
// =============================================================

#[test]
fn final_positions_are_start_plus_delta_exactly() {
    let mut store = make_store();
    let a = add(&mut store, ObjectKind::Sticky, 100.0, 100.0, 50.0, 50.0);
    let b = add(&mut store, ObjectKind::Sticky, 300.0, 250.0, 50.0, 50.0);
    let c = add(&mut store, ObjectKind::Sticky, -40.0, 10.0, 50.0, 50.0);
    let selection = vec![a, b, c];

    let mut ctx = GroupMoveContext::begin(&store, a, &selection).unwrap();

    // Many jittery intermediate events; only the last one matters.
    let mut now = 0;
    for i in 1..=37 {
        let t = f64::from(i);
        ctx.apply(&mut store, Point::new(100.0 + t * 3.7, 100.0 - t * 1.3), now);
        now += 7;
    }
    ctx.apply(&mut store, Point::new(275.0, 40.0), now);
    ctx.finish(&mut store, now);

    // delta = (175, -60), applied to every member's *start* position.
    assert_eq!(store.get(&a).unwrap().x, 275.0);
    assert_eq!(store.get(&a).unwrap().y, 40.0);
    assert_eq!(store.get(&b).unwrap().x, 475.0);
    assert_eq!(store.get(&b).unwrap().y, 190.0);
    assert_eq!(store.get(&c).unwrap().x, 135.0);
    assert_eq!(store.get(&c).unwrap().y, -50.0);
}

#[test]
fn solo_drag_moves_only_the_primary() {
    let mut store = make_store();
    let a = add(&mut store, ObjectKind::Sticky, 0.0, 0.0, 50.0, 50.0);
    let b = add(&mut store, ObjectKind::Sticky, 500.0, 500.0, 50.0, 50.0);

    let mut ctx = GroupMoveContext::begin(&store, a, &[]).unwrap();
    ctx.apply(&mut store, Point::new(10.0, 20.0), 0);
    ctx.finish(&mut store, 100);

    assert_eq!(store.get(&a).unwrap().x, 10.0);
    assert_eq!(store.get(&b).unwrap().x, 500.0);
}

// =============================================================
// Frame containment at drag start
// =============================================================

#[test]
fn dragging_a_frame_carries_children_by_reference_and_overlap() {
    let mut store = make_store();
    let frame = add(&mut store, ObjectKind::Frame, 0.0, 0.0, 400.0, 300.0);

    // Center inside the frame: joins by overlap.
    let inside = add(&mut store, ObjectKind::Sticky, 50.0, 50.0, 100.0, 100.0);
    // Outside, but explicitly parented: joins by reference.
    let referenced = add(&mut store, ObjectKind::Sticky, 900.0, 900.0, 100.0, 100.0);
    let fields = PartialBoardObject { parent_frame_id: Some(frame), ..PartialBoardObject::default() };
    store.update(&referenced, &fields, 0);
    // Outside and unparented: stays put.
    let outside = add(&mut store, ObjectKind::Sticky, 900.0, 0.0, 100.0, 100.0);

    let mut ctx = GroupMoveContext::begin(&store, frame, &[]).unwrap();
    assert_eq!(ctx.member_ids().len(), 3);

    ctx.apply(&mut store, Point::new(100.0, 100.0), 0);
    ctx.finish(&mut store, 100);

    assert_eq!(store.get(&inside).unwrap().x, 150.0);
    assert_eq!(store.get(&referenced).unwrap().x, 1000.0);
    assert_eq!(store.get(&outside).unwrap().x, 900.0);
}

#[test]
fn drop_inside_frame_assigns_parent_reference() {
    let mut store = make_store();
    let frame = add(&mut store, ObjectKind::Frame, 500.0, 500.0, 400.0, 300.0);
    let note = add(&mut store, ObjectKind::Sticky, 0.0, 0.0, 100.0, 100.0);

    let mut ctx = GroupMoveContext::begin(&store, note, &[]).unwrap();
    ctx.apply(&mut store, Point::new(600.0, 560.0), 0);
    ctx.finish(&mut store, 100);

    assert_eq!(store.get(&note).unwrap().parent_frame_id, Some(frame));
}

// =============================================================
// Connector endpoints
// =============================================================

#[test]
fn edge_dependents_shift_both_free_endpoints() {
    let mut store = make_store();
    let a = add(&mut store, ObjectKind::Sticky, 0.0, 0.0, 50.0, 50.0);
    let arrow = store.create(BoardObject::new(
        ObjectKind::Arrow,
        0.0,
        0.0,
        0.0,
        0.0,
        json!({"x1": 10.0, "y1": 10.0, "x2": 60.0, "y2": 30.0}),
        0,
    ));

    let selection = vec![a, arrow];
    let mut ctx = GroupMoveContext::begin(&store, a, &selection).unwrap();
    ctx.apply(&mut store, Point::new(25.0, 5.0), 0);
    ctx.finish(&mut store, 100);

    let props = store.get(&arrow).unwrap().props.clone();
    assert_eq!(props["x1"], 35.0);
    assert_eq!(props["y1"], 15.0);
    assert_eq!(props["x2"], 85.0);
    assert_eq!(props["y2"], 35.0);
}

// =============================================================
// Coalesced persistence
// =============================================================

#[test]
fn durable_writes_are_coalesced_per_object() {
    let mut store = make_store();
    let a = add(&mut store, ObjectKind::Sticky, 0.0, 0.0, 50.0, 50.0);
    let baseline = store.sink().ops.len();

    let mut ctx = GroupMoveContext::begin(&store, a, &[]).unwrap();
    // 20 move events in 60ms: interval allows at most 2 durable writes.
    for i in 0..20 {
        ctx.apply(&mut store, Point::new(f64::from(i), 0.0), i64::from(i) * 3);
    }
    let during = store.sink().ops.len() - baseline;
    assert!(during <= 2, "expected ≤2 coalesced writes, got {during}");

    // Drag end always flushes once more.
    ctx.finish(&mut store, 60);
    assert_eq!(store.sink().ops.len(), baseline + during + 1);
    assert_eq!(store.get(&a).unwrap().x, 19.0);
}

// =============================================================
// Undo integration
// =============================================================

#[test]
fn one_undo_reverses_the_whole_group_move() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();
    let a = add(&mut store, ObjectKind::Sticky, 10.0, 10.0, 50.0, 50.0);
    let b = add(&mut store, ObjectKind::Sticky, 200.0, 200.0, 50.0, 50.0);
    let selection = vec![a, b];

    let mut ctx = GroupMoveContext::begin(&store, a, &selection).unwrap();
    ctx.apply(&mut store, Point::new(110.0, 10.0), 0);
    let descriptor = ctx.finish(&mut store, 100);
    undo.record(descriptor);

    assert!(undo.undo(&mut store, 1_000));
    assert_eq!(store.get(&a).unwrap().x, 10.0);
    assert_eq!(store.get(&b).unwrap().x, 200.0);
}

#[test]
fn undoing_a_drop_clears_the_assigned_frame_reference() {
    let mut store = make_store();
    let mut undo = UndoRedoStack::new();
    let frame = add(&mut store, ObjectKind::Frame, 500.0, 500.0, 400.0, 300.0);
    let note = add(&mut store, ObjectKind::Sticky, 0.0, 0.0, 100.0, 100.0);

    let mut ctx = GroupMoveContext::begin(&store, note, &[]).unwrap();
    ctx.apply(&mut store, Point::new(600.0, 560.0), 0);
    undo.record(ctx.finish(&mut store, 100));
    assert_eq!(store.get(&note).unwrap().parent_frame_id, Some(frame));

    assert!(undo.undo(&mut store, 1_000));
    let obj = store.get(&note).unwrap();
    assert!(obj.parent_frame_id.is_none());
    assert_eq!((obj.x, obj.y), (0.0, 0.0));
}

#[test]
fn begin_on_missing_primary_returns_none() {
    let store = make_store();
    assert!(GroupMoveContext::begin(&store, uuid::Uuid::new_v4(), &[]).is_none());
}
