//! Group-move coordination: one consistent translation delta for a drag that
//! affects multiple dependent objects.
//!
//! The gesture follows a seed/apply/commit lifecycle. `begin` snapshots the
//! primary's start position and every dependent's start geometry; every move
//! event computes `delta = current(primary) − start(primary)` and writes
//! `start + delta` for each dependent — never an increment on the previous
//! frame's position, so intermediate events cannot accumulate drift. Visual
//! staging happens on every event; durable writes are coalesced to at most
//! one per [`DRAG_PERSIST_INTERVAL_MS`] per object, with an unconditional
//! flush on drag end.

#[cfg(test)]
#[path = "group_move_test.rs"]
mod group_move_test;

use std::collections::HashMap;

use log::debug;
use serde_json::json;

use crate::consts::DRAG_PERSIST_INTERVAL_MS;
use crate::layout::{Point, Rect, object_bounds};
use crate::object::{BoardObject, ObjectId, ObjectKind, PartialBoardObject, Props};
use crate::persist::PersistSink;
use crate::store::ObjectStore;
use crate::undo::UndoOp;

/// Start geometry of one drag member.
#[derive(Debug, Clone)]
struct StartGeom {
    x: f64,
    y: f64,
    /// Free endpoints for edge kinds not anchored to objects.
    endpoints: Option<(f64, f64, f64, f64)>,
}

/// Per-gesture context threaded through the whole drag.
///
/// Owns the start snapshot, the member list, and the per-object persist
/// clock; nothing about the gesture lives in closures or globals.
#[derive(Debug)]
pub struct GroupMoveContext {
    primary: ObjectId,
    start_primary: Point,
    starts: Vec<(ObjectId, StartGeom)>,
    start_snapshots: Vec<BoardObject>,
    last_persist_ms: HashMap<ObjectId, i64>,
}

impl GroupMoveContext {
    /// Seed a drag of `primary`.
    ///
    /// Dependents are the current multi-selection when it includes the
    /// primary; when a frame is dragged on its own, its children join by
    /// explicit `parent_frame_id` or, as a one-shot heuristic, by
    /// center-point overlap at this moment. Returns `None` when the primary
    /// is not visible.
    pub fn begin<S: PersistSink>(
        store: &ObjectStore<S>,
        primary: ObjectId,
        selection: &[ObjectId],
    ) -> Option<Self> {
        let primary_obj = store.get(&primary)?;
        let start_primary = Point::new(primary_obj.x, primary_obj.y);

        let mut member_ids: Vec<ObjectId> = if selection.contains(&primary) && selection.len() > 1 {
            selection.to_vec()
        } else if primary_obj.kind == ObjectKind::Frame {
            let frame_bounds = object_bounds(primary_obj);
            let mut ids = vec![primary];
            ids.extend(frame_children(store, &primary, frame_bounds));
            ids
        } else {
            vec![primary]
        };
        member_ids.sort_unstable();
        member_ids.dedup();

        let mut starts = Vec::with_capacity(member_ids.len());
        let mut start_snapshots = Vec::with_capacity(member_ids.len());
        for id in member_ids {
            let Some(obj) = store.get(&id) else {
                continue;
            };
            let endpoints = obj.kind.is_edge().then(|| Props::new(&obj.props).endpoints()).flatten();
            starts.push((id, StartGeom { x: obj.x, y: obj.y, endpoints }));
            start_snapshots.push(obj.clone());
        }
        debug!("group move: primary {primary}, {} members", starts.len());

        Some(Self {
            primary,
            start_primary,
            starts,
            start_snapshots,
            last_persist_ms: HashMap::new(),
        })
    }

    /// The primary object being dragged.
    #[must_use]
    pub fn primary(&self) -> ObjectId {
        self.primary
    }

    /// Ids of every object moved by this gesture.
    #[must_use]
    pub fn member_ids(&self) -> Vec<ObjectId> {
        self.starts.iter().map(|(id, _)| *id).collect()
    }

    /// Apply one move event: the primary now sits at `current_primary`.
    ///
    /// Stages every member visually and issues coalesced durable writes for
    /// members whose persist interval has elapsed.
    pub fn apply<S: PersistSink>(&mut self, store: &mut ObjectStore<S>, current_primary: Point, now_ms: i64) {
        let dx = current_primary.x - self.start_primary.x;
        let dy = current_primary.y - self.start_primary.y;

        for (id, start) in &self.starts {
            let fields = translated_fields(start, dx, dy);
            if !store.stage(id, &fields) {
                continue;
            }
            let due = self
                .last_persist_ms
                .get(id)
                .is_none_or(|last| now_ms - last >= DRAG_PERSIST_INTERVAL_MS);
            if due {
                store.persist_position(id, now_ms);
                self.last_persist_ms.insert(*id, now_ms);
            }
        }
    }

    /// End the drag: flush a durable write for every member unconditionally
    /// and return the single atomic descriptor that undoes the whole move.
    ///
    /// For a lone non-frame primary, drop-time center-point overlap against
    /// visible frames assigns (or reassigns) `parent_frame_id` — the only
    /// moment geometry decides containment.
    pub fn finish<S: PersistSink>(mut self, store: &mut ObjectStore<S>, now_ms: i64) -> UndoOp {
        for (id, _) in &self.starts {
            store.persist_position(id, now_ms);
        }

        if self.starts.len() == 1 {
            self.assign_drop_containment(store, now_ms);
        }

        let ops = self
            .start_snapshots
            .drain(..)
            .map(UndoOp::Restore)
            .collect();
        UndoOp::Batch(ops)
    }

    fn assign_drop_containment<S: PersistSink>(&self, store: &mut ObjectStore<S>, now_ms: i64) {
        let Some(obj) = store.get(&self.primary) else {
            return;
        };
        if obj.kind == ObjectKind::Frame || obj.kind.is_edge() {
            return;
        }
        let (cx, cy) = obj.center();
        let current_parent = obj.parent_frame_id;
        let target = store
            .objects()
            .into_iter()
            .filter(|o| o.kind == ObjectKind::Frame)
            .find(|frame| object_bounds(frame).contains_point(Point::new(cx, cy)))
            .map(|frame| frame.id);
        if let Some(frame_id) = target {
            if current_parent != Some(frame_id) {
                let fields = PartialBoardObject { parent_frame_id: Some(frame_id), ..PartialBoardObject::default() };
                store.update(&self.primary, &fields, now_ms);
            }
        }
    }
}

/// Fields that place a member at its start geometry shifted by `(dx, dy)`.
/// Edge dependents shift both free endpoints by the same delta.
fn translated_fields(start: &StartGeom, dx: f64, dy: f64) -> PartialBoardObject {
    let mut fields = PartialBoardObject::position(start.x + dx, start.y + dy);
    if let Some((x1, y1, x2, y2)) = start.endpoints {
        fields.props = Some(json!({
            "x1": x1 + dx,
            "y1": y1 + dy,
            "x2": x2 + dx,
            "y2": y2 + dy,
        }));
    }
    fields
}

/// Children of a frame at drag start: explicit `parent_frame_id` reference,
/// or center point inside the frame's bounds (judged once, here).
fn frame_children<S: PersistSink>(store: &ObjectStore<S>, frame_id: &ObjectId, frame_bounds: Rect) -> Vec<ObjectId> {
    store
        .objects()
        .into_iter()
        .filter(|obj| obj.id != *frame_id)
        .filter(|obj| {
            if obj.parent_frame_id.as_ref() == Some(frame_id) {
                return true;
            }
            if obj.kind.is_edge() {
                return false;
            }
            let (cx, cy) = obj.center();
            frame_bounds.contains_point(Point::new(cx, cy))
        })
        .map(|obj| obj.id)
        .collect()
}
