//! Ordered batch execution of abstract actions.
//!
//! DESIGN
//! ======
//! One batch is one UI gesture or one agent turn. The interpreter:
//!
//! 1. Reorders: when any layout action is present, creates run first and
//!    layout actions last; everything else keeps its relative order between.
//! 2. Resolves the just-created sentinel: an empty id-list argument means
//!    "every object created earlier in this same batch".
//! 3. Applies placement defaults: actions without coordinates land at the
//!    viewport center plus a deterministic cascading offset, so N
//!    center-placed objects don't stack exactly.
//! 4. Applies scale-aware sizing: default footprints shrink at high zoom and
//!    grow at low zoom, clamped.
//! 5. Backfills structured templates whose substantive content is missing
//!    with small generic placeholders — never structurally empty. The agent
//!    does the same on its side; this is the second, defense-in-depth pass.
//! 6. Isolates failures: a bad action is skipped with a warning and the
//!    batch continues; same-type successes coalesce into one summary notice.
//!
//! Each batch records one atomic undo descriptor. The only state that
//! survives a batch is the cascading-offset counter.

#[cfg(test)]
#[path = "interpreter_test.rs"]
mod interpreter_test;

use log::{info, warn};
use serde_json::json;

use crate::actions::Action;
use crate::consts::{
    CASCADE_STEP, CASCADE_WRAP, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, DEFAULT_LAYOUT_GAP,
    DEFAULT_SHAPE_HEIGHT, DEFAULT_SHAPE_WIDTH, DEFAULT_STICKY_SIZE,
};
use crate::layout::{Point, grid_dims, grid_positions, size_multiplier, space_evenly_x};
use crate::notify::{Broadcaster, Notice};
use crate::object::{BoardObject, ObjectId, ObjectKind, PartialBoardObject};
use crate::persist::PersistSink;
use crate::store::ObjectStore;
use crate::undo::{UndoOp, UndoRedoStack};

/// What the interpreter needs to know about the current view.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    /// World point at the center of the screen.
    pub center: Point,
    /// Current zoom factor.
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { center: Point::new(0.0, 0.0), zoom: 1.0 }
    }
}

/// Why a single action was skipped. Never aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The action references an object that is not visible.
    #[error("object {0} not found")]
    MissingObject(ObjectId),
    /// The action cannot be executed as given.
    #[error("not executable: {0}")]
    NotExecutable(&'static str),
}

/// Result of one batch.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Every object created by this batch, in creation order.
    pub created: Vec<ObjectId>,
    /// Actions that executed successfully.
    pub executed: usize,
    /// Actions skipped (dangling ids, malformed payloads, unknown types).
    pub skipped: usize,
}

/// Turns ordered action lists into correctly-sequenced board mutations.
pub struct ActionBatchInterpreter {
    cascade: u32,
    notices: Broadcaster<Notice>,
}

/// Per-batch bookkeeping threaded through the executors.
struct BatchCtx {
    created: Vec<ObjectId>,
    undo_ops: Vec<UndoOp>,
    now_ms: i64,
}

impl ActionBatchInterpreter {
    /// Create an interpreter publishing summaries on `notices`.
    #[must_use]
    pub fn new(notices: Broadcaster<Notice>) -> Self {
        Self { cascade: 0, notices }
    }

    /// Execute one batch against the store.
    pub fn run_batch<S: PersistSink>(
        &mut self,
        store: &mut ObjectStore<S>,
        undo: &mut UndoRedoStack,
        view: &Viewport,
        actions: Vec<Action>,
        now_ms: i64,
    ) -> BatchOutcome {
        let actions = reorder(actions);
        let mut ctx = BatchCtx { created: Vec::new(), undo_ops: Vec::new(), now_ms };
        let mut outcome = BatchOutcome::default();
        // (label, successes) in first-success order, for coalesced notices.
        let mut successes: Vec<(&'static str, usize)> = Vec::new();

        for action in actions {
            let label = action.summary_label();
            match self.execute(store, view, &mut ctx, action) {
                Ok(()) => {
                    outcome.executed += 1;
                    match successes.iter_mut().find(|(l, _)| *l == label) {
                        Some((_, n)) => *n += 1,
                        None => successes.push((label, 1)),
                    }
                }
                Err(err) => {
                    warn!("batch action skipped: {err}");
                    outcome.skipped += 1;
                }
            }
        }

        if !ctx.undo_ops.is_empty() {
            undo.record(UndoOp::Batch(ctx.undo_ops));
        }
        for (label, n) in successes {
            let message = if n == 1 { label.to_owned() } else { format!("{label} ×{n}") };
            self.notices.publish(&Notice::info(message));
        }
        info!(
            "batch done: {} executed, {} skipped, {} created",
            outcome.executed,
            outcome.skipped,
            ctx.created.len()
        );
        outcome.created = ctx.created;
        outcome
    }

    /// Next default placement: viewport center shifted by the cascading
    /// offset, minus half the footprint so the object is centered.
    fn place(&mut self, view: &Viewport, width: f64, height: f64) -> Point {
        let step = f64::from(self.cascade % CASCADE_WRAP) * CASCADE_STEP;
        self.cascade += 1;
        Point::new(
            view.center.x - width * 0.5 + step,
            view.center.y - height * 0.5 + step,
        )
    }

    /// Anchor for composite layouts: explicit coordinates, or a cascaded
    /// center placement of the composite's overall footprint.
    fn anchor(&mut self, view: &Viewport, x: Option<f64>, y: Option<f64>, width: f64, height: f64) -> Point {
        match (x, y) {
            (Some(x), Some(y)) => Point::new(x, y),
            _ => self.place(view, width, height),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn execute<S: PersistSink>(
        &mut self,
        store: &mut ObjectStore<S>,
        view: &Viewport,
        ctx: &mut BatchCtx,
        action: Action,
    ) -> Result<(), ActionError> {
        let m = size_multiplier(view.zoom);
        match action {
            Action::CreateShape { shape, x, y, width, height, color } => {
                let kind = shape.unwrap_or(ObjectKind::Rectangle);
                if kind.is_edge() {
                    return Err(ActionError::NotExecutable("use createConnector for edges"));
                }
                let (dw, dh) = if kind == ObjectKind::Circle {
                    (DEFAULT_SHAPE_HEIGHT, DEFAULT_SHAPE_HEIGHT)
                } else {
                    (DEFAULT_SHAPE_WIDTH, DEFAULT_SHAPE_HEIGHT)
                };
                let w = width.unwrap_or(dw * m);
                let h = height.unwrap_or(dh * m);
                let at = self.anchor(view, x, y, w, h);
                let props = json!({ "color": color.as_deref().unwrap_or("#4CAF50") });
                create(store, ctx, kind, at, w, h, props);
                Ok(())
            }
            Action::CreateStickyNote { text, x, y, color } => {
                let size = DEFAULT_STICKY_SIZE * m;
                let at = self.anchor(view, x, y, size, size);
                let props = json!({
                    "text": text.as_deref().unwrap_or(""),
                    "color": color.as_deref().unwrap_or("#FFEB3B"),
                });
                create(store, ctx, ObjectKind::Sticky, at, size, size, props);
                Ok(())
            }
            Action::CreateFrame { title, x, y, width, height } => {
                let w = width.unwrap_or(DEFAULT_FRAME_WIDTH * m);
                let h = height.unwrap_or(DEFAULT_FRAME_HEIGHT * m);
                let at = self.anchor(view, x, y, w, h);
                let props = json!({ "title": title.as_deref().unwrap_or("Untitled") });
                create(store, ctx, ObjectKind::Frame, at, w, h, props);
                Ok(())
            }
            Action::CreateConnector { from_id, to_id, style } => {
                if !store.contains(&from_id) {
                    return Err(ActionError::MissingObject(from_id));
                }
                if !store.contains(&to_id) {
                    return Err(ActionError::MissingObject(to_id));
                }
                connect(store, ctx, from_id, to_id, style.as_deref());
                Ok(())
            }
            Action::MoveObject { object_id, x, y } => {
                update(store, ctx, &object_id, &PartialBoardObject::position(x, y))
            }
            Action::ResizeObject { object_id, width, height } => {
                update(store, ctx, &object_id, &PartialBoardObject::size(width, height))
            }
            Action::UpdateText { object_id, new_text } => {
                let is_frame = store.get(&object_id).is_some_and(|o| o.kind == ObjectKind::Frame);
                let key = if is_frame { "title" } else { "text" };
                update(store, ctx, &object_id, &PartialBoardObject::props(json!({ key: new_text })))
            }
            Action::ChangeColor { object_id, color } => {
                update(store, ctx, &object_id, &PartialBoardObject::props(json!({ "color": color })))
            }
            Action::ArrangeInGrid { object_ids, columns, x, y } => {
                let ids = resolve_ids(store, &object_ids, &ctx.created);
                if ids.is_empty() {
                    return Err(ActionError::NotExecutable("no objects to arrange"));
                }
                let n = ids.len();
                let cols = columns.filter(|c| *c > 0).unwrap_or_else(|| grid_dims(n).0);
                let (cell_w, cell_h) = max_footprint(store, &ids);
                let rows = n.div_ceil(cols);
                #[allow(clippy::cast_precision_loss)]
                let total_w = cols as f64 * cell_w + (cols - 1) as f64 * DEFAULT_LAYOUT_GAP;
                #[allow(clippy::cast_precision_loss)]
                let total_h = rows as f64 * cell_h + (rows - 1) as f64 * DEFAULT_LAYOUT_GAP;
                let origin = match (x, y) {
                    (Some(x), Some(y)) => Point::new(x, y),
                    _ => Point::new(view.center.x - total_w * 0.5, view.center.y - total_h * 0.5),
                };
                let positions = grid_positions(origin, n, cols, cell_w, cell_h, DEFAULT_LAYOUT_GAP);
                for (id, at) in ids.iter().zip(positions) {
                    let _ = update(store, ctx, id, &PartialBoardObject::position(at.x, at.y));
                }
                Ok(())
            }
            Action::SpaceEvenly { object_ids } => {
                let ids = resolve_ids(store, &object_ids, &ctx.created);
                if ids.is_empty() {
                    return Err(ActionError::NotExecutable("no objects to space"));
                }
                let sizes: Vec<(f64, f64)> = ids
                    .iter()
                    .filter_map(|id| store.get(id))
                    .map(|o| {
                        (
                            o.width.unwrap_or(DEFAULT_STICKY_SIZE),
                            o.height.unwrap_or(DEFAULT_STICKY_SIZE),
                        )
                    })
                    .collect();
                let positions = space_evenly_x(view.center, &sizes, DEFAULT_LAYOUT_GAP);
                for (id, at) in ids.iter().zip(positions) {
                    let _ = update(store, ctx, id, &PartialBoardObject::position(at.x, at.y));
                }
                Ok(())
            }
            Action::CreateStickyNoteGrid { texts, count, columns, color, x, y } => {
                let texts = padded_texts(texts, count.unwrap_or(0), "Note");
                let n = texts.len();
                let cols = columns.filter(|c| *c > 0).unwrap_or_else(|| grid_dims(n).0);
                let size = DEFAULT_STICKY_SIZE * m;
                let rows = n.div_ceil(cols);
                #[allow(clippy::cast_precision_loss)]
                let total_w = cols as f64 * size + (cols - 1) as f64 * DEFAULT_LAYOUT_GAP;
                #[allow(clippy::cast_precision_loss)]
                let total_h = rows as f64 * size + (rows - 1) as f64 * DEFAULT_LAYOUT_GAP;
                let origin = self.anchor(view, x, y, total_w, total_h);
                let positions = grid_positions(origin, n, cols, size, size, DEFAULT_LAYOUT_GAP);
                let color = color.as_deref().unwrap_or("#FFEB3B");
                for (text, at) in texts.iter().zip(positions) {
                    create(store, ctx, ObjectKind::Sticky, at, size, size, json!({ "text": text, "color": color }));
                }
                Ok(())
            }
            Action::CreateSwotTemplate { strengths, weaknesses, opportunities, threats, x, y } => {
                let quad_w = 380.0 * m;
                let quad_h = 300.0 * m;
                let gap = DEFAULT_LAYOUT_GAP;
                let origin = self.anchor(view, x, y, quad_w * 2.0 + gap, quad_h * 2.0 + gap);
                let quads = [
                    ("Strengths", "#C8E6C9", strengths, Point::new(origin.x, origin.y)),
                    ("Weaknesses", "#FFCDD2", weaknesses, Point::new(origin.x + quad_w + gap, origin.y)),
                    ("Opportunities", "#BBDEFB", opportunities, Point::new(origin.x, origin.y + quad_h + gap)),
                    ("Threats", "#FFE0B2", threats, Point::new(origin.x + quad_w + gap, origin.y + quad_h + gap)),
                ];
                for (title, color, items, at) in quads {
                    let frame = create(
                        store,
                        ctx,
                        ObjectKind::Frame,
                        at,
                        quad_w,
                        quad_h,
                        json!({ "title": title }),
                    );
                    let items = fallback_items(items, title);
                    fill_frame_with_notes(store, ctx, frame, at, quad_w, &items, color, m);
                }
                Ok(())
            }
            Action::CreateUserJourney { title, stages, x, y } => {
                let stages = fallback_stages(stages);
                let step_w = 200.0 * m;
                let step_h = 110.0 * m;
                let gap = 70.0 * m;
                #[allow(clippy::cast_precision_loss)]
                let total_w = stages.len() as f64 * step_w + (stages.len() - 1) as f64 * gap;
                let origin = self.anchor(view, x, y, total_w, step_h + 70.0 * m);
                let title_text = title.as_deref().unwrap_or("User journey");
                create(
                    store,
                    ctx,
                    ObjectKind::Textbox,
                    origin,
                    total_w,
                    40.0 * m,
                    json!({ "text": title_text, "fontSize": 20.0 }),
                );
                let row_y = origin.y + 70.0 * m;
                let mut previous: Option<ObjectId> = None;
                for (i, stage) in stages.iter().enumerate() {
                    #[allow(clippy::cast_precision_loss)]
                    let at = Point::new(origin.x + i as f64 * (step_w + gap), row_y);
                    let id = create(
                        store,
                        ctx,
                        ObjectKind::Rectangle,
                        at,
                        step_w,
                        step_h,
                        json!({ "text": stage, "color": "#E1F5FE" }),
                    );
                    if let Some(prev) = previous {
                        connect(store, ctx, prev, id, Some("arrow"));
                    }
                    previous = Some(id);
                }
                Ok(())
            }
            Action::CreateRetrospectiveBoard { went_well, to_improve, action_items, x, y } => {
                let col_w = 340.0 * m;
                let col_h = 460.0 * m;
                let gap = DEFAULT_LAYOUT_GAP;
                let origin = self.anchor(view, x, y, col_w * 3.0 + gap * 2.0, col_h);
                let columns = [
                    ("Went well", "#C8E6C9", went_well),
                    ("To improve", "#FFCDD2", to_improve),
                    ("Action items", "#BBDEFB", action_items),
                ];
                for (i, (title, color, items)) in columns.into_iter().enumerate() {
                    #[allow(clippy::cast_precision_loss)]
                    let at = Point::new(origin.x + i as f64 * (col_w + gap), origin.y);
                    let frame = create(store, ctx, ObjectKind::Frame, at, col_w, col_h, json!({ "title": title }));
                    let items = fallback_items(items, title);
                    fill_frame_with_notes(store, ctx, frame, at, col_w, &items, color, m);
                }
                Ok(())
            }
            Action::CreateFrameWithNotes { title, notes, x, y } => {
                let w = DEFAULT_FRAME_WIDTH * m;
                let h = DEFAULT_FRAME_HEIGHT * m;
                let at = self.anchor(view, x, y, w, h);
                let title = title.as_deref().unwrap_or("Notes");
                let frame = create(store, ctx, ObjectKind::Frame, at, w, h, json!({ "title": title }));
                let notes = fallback_items(notes, title);
                fill_frame_with_notes(store, ctx, frame, at, w, &notes, "#FFEB3B", m);
                Ok(())
            }
            Action::AddFlowchart { steps, x, y } => {
                let steps = fallback_steps(steps);
                let node_w = 180.0 * m;
                let node_h = 90.0 * m;
                let gap = 70.0 * m;
                #[allow(clippy::cast_precision_loss)]
                let total_w = steps.len() as f64 * node_w + (steps.len() - 1) as f64 * gap;
                let origin = self.anchor(view, x, y, total_w, node_h);
                let mut previous: Option<ObjectId> = None;
                for (i, step) in steps.iter().enumerate() {
                    #[allow(clippy::cast_precision_loss)]
                    let at = Point::new(origin.x + i as f64 * (node_w + gap), origin.y);
                    let kind = if i == 0 || i == steps.len() - 1 { ObjectKind::Oval } else { ObjectKind::Rectangle };
                    let id = create(store, ctx, kind, at, node_w, node_h, json!({ "text": step, "color": "#FFF9C4" }));
                    if let Some(prev) = previous {
                        connect(store, ctx, prev, id, Some("arrow"));
                    }
                    previous = Some(id);
                }
                Ok(())
            }
            Action::DeleteObject { object_id } => {
                let prior = store.delete(&object_id).ok_or(ActionError::MissingObject(object_id))?;
                ctx.undo_ops.push(UndoOp::Recreate(prior));
                Ok(())
            }
            Action::ClearBoard {} => {
                let ids = store.object_ids();
                if ids.is_empty() {
                    return Err(ActionError::NotExecutable("board already empty"));
                }
                for id in ids {
                    if let Some(prior) = store.delete(&id) {
                        ctx.undo_ops.push(UndoOp::Recreate(prior));
                    }
                }
                Ok(())
            }
            Action::Unknown => Err(ActionError::NotExecutable("unknown action type")),
        }
    }
}

/// Stable create-first / layout-last reordering, applied only when the batch
/// contains a layout action.
fn reorder(actions: Vec<Action>) -> Vec<Action> {
    if !actions.iter().any(Action::is_layout) {
        return actions;
    }
    let mut creates = Vec::new();
    let mut middle = Vec::new();
    let mut layouts = Vec::new();
    for action in actions {
        if action.is_create() {
            creates.push(action);
        } else if action.is_layout() {
            layouts.push(action);
        } else {
            middle.push(action);
        }
    }
    creates.extend(middle);
    creates.extend(layouts);
    creates
}

/// Resolve an id-list argument: the empty list is the just-created sentinel.
/// Dangling ids are silently dropped (the action itself may still fail if
/// nothing remains).
fn resolve_ids<S: PersistSink>(store: &ObjectStore<S>, ids: &[ObjectId], created: &[ObjectId]) -> Vec<ObjectId> {
    let source = if ids.is_empty() { created } else { ids };
    source.iter().filter(|id| store.contains(id)).copied().collect()
}

/// Largest footprint among the given objects, with sticky-note fallback for
/// anything unsized.
fn max_footprint<S: PersistSink>(store: &ObjectStore<S>, ids: &[ObjectId]) -> (f64, f64) {
    let mut w: f64 = 0.0;
    let mut h: f64 = 0.0;
    for id in ids {
        if let Some(obj) = store.get(id) {
            w = w.max(obj.width.unwrap_or(DEFAULT_STICKY_SIZE));
            h = h.max(obj.height.unwrap_or(DEFAULT_STICKY_SIZE));
        }
    }
    (w.max(1.0), h.max(1.0))
}

/// Create one object and record it in the batch context.
fn create<S: PersistSink>(
    store: &mut ObjectStore<S>,
    ctx: &mut BatchCtx,
    kind: ObjectKind,
    at: Point,
    width: f64,
    height: f64,
    props: serde_json::Value,
) -> ObjectId {
    let obj = BoardObject::new(kind, at.x, at.y, width, height, props, ctx.now_ms);
    let id = store.create(obj);
    ctx.created.push(id);
    ctx.undo_ops.push(UndoOp::Remove(id));
    id
}

/// Create a connector/arrow between two objects. No geometry of its own.
fn connect<S: PersistSink>(
    store: &mut ObjectStore<S>,
    ctx: &mut BatchCtx,
    from_id: ObjectId,
    to_id: ObjectId,
    style: Option<&str>,
) -> ObjectId {
    let style = style.unwrap_or("arrow");
    let kind = if style == "line" { ObjectKind::Connector } else { ObjectKind::Arrow };
    let props = json!({
        "sourceId": from_id.to_string(),
        "targetId": to_id.to_string(),
        "style": style,
    });
    create(store, ctx, kind, Point::new(0.0, 0.0), 0.0, 0.0, props)
}

/// Snapshot-then-update for mutating actions, so the batch descriptor can
/// restore the prior state.
fn update<S: PersistSink>(
    store: &mut ObjectStore<S>,
    ctx: &mut BatchCtx,
    id: &ObjectId,
    fields: &PartialBoardObject,
) -> Result<(), ActionError> {
    let prior = store.get(id).cloned().ok_or(ActionError::MissingObject(*id))?;
    store.update(id, fields, ctx.now_ms);
    ctx.undo_ops.push(UndoOp::Restore(prior));
    Ok(())
}

/// Lay sticky notes out in a small grid inside a frame, tagged with
/// `parent_frame_id`.
fn fill_frame_with_notes<S: PersistSink>(
    store: &mut ObjectStore<S>,
    ctx: &mut BatchCtx,
    frame_id: ObjectId,
    frame_at: Point,
    frame_w: f64,
    items: &[String],
    color: &str,
    m: f64,
) {
    let note = 120.0 * m;
    let gap = 16.0 * m;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cols = (((frame_w - gap) / (note + gap)).floor().max(1.0)) as usize;
    let origin = Point::new(frame_at.x + gap, frame_at.y + 44.0 * m);
    let positions = grid_positions(origin, items.len(), cols, note, note, gap);
    for (text, at) in items.iter().zip(positions) {
        let mut obj = BoardObject::new(
            ObjectKind::Sticky,
            at.x,
            at.y,
            note,
            note,
            json!({ "text": text, "color": color }),
            ctx.now_ms,
        );
        obj.parent_frame_id = Some(frame_id);
        let id = store.create(obj);
        ctx.created.push(id);
        ctx.undo_ops.push(UndoOp::Remove(id));
    }
}

/// Pad or synthesize numbered texts. Caller texts always win; a requested
/// `count` beyond them is filled with numbered placeholders, and a fully
/// empty request falls back to four.
fn padded_texts(texts: Vec<String>, count: usize, prefix: &str) -> Vec<String> {
    let mut texts: Vec<String> = texts.into_iter().filter(|t| !t.trim().is_empty()).collect();
    let target = if texts.is_empty() { count.max(4) } else { texts.len().max(count) };
    for i in texts.len()..target {
        texts.push(format!("{prefix} {}", i + 1));
    }
    texts
}

/// Template-section fallback: caller content wins; an empty section gets one
/// generic placeholder so the template is never structurally empty.
fn fallback_items(items: Vec<String>, section: &str) -> Vec<String> {
    let items: Vec<String> = items.into_iter().filter(|t| !t.trim().is_empty()).collect();
    if items.is_empty() {
        vec![format!("Add to {}", section.to_lowercase())]
    } else {
        items
    }
}

fn fallback_stages(stages: Vec<String>) -> Vec<String> {
    let stages: Vec<String> = stages.into_iter().filter(|t| !t.trim().is_empty()).collect();
    if stages.is_empty() {
        (1..=3).map(|i| format!("Stage {i}")).collect()
    } else {
        stages
    }
}

fn fallback_steps(steps: Vec<String>) -> Vec<String> {
    let steps: Vec<String> = steps.into_iter().filter(|t| !t.trim().is_empty()).collect();
    if steps.is_empty() {
        vec!["Start".to_owned(), "Step 2".to_owned(), "End".to_owned()]
    } else {
        steps
    }
}
