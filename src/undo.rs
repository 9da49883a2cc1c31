//! Linear undo/redo over inverse-operation descriptors.
//!
//! Every reversible mutation records, up front, the descriptor that would
//! undo it: `Remove` for a create, `Recreate` for a delete, `Restore` (a full
//! prior snapshot) for an update, and `Batch` for multi-object operations
//! that must reverse atomically. `undo` pops a descriptor, captures its
//! counter-inverse from the current store state onto the redo stack, and
//! applies it through the store's normal entry points — so undone changes
//! persist (and race) exactly like any other write.
//!
//! Any new user mutation clears redo: the model is a line, not a tree.

#[cfg(test)]
#[path = "undo_test.rs"]
mod undo_test;

use crate::consts::UNDO_DEPTH;
use crate::object::{BoardObject, ObjectId};
use crate::persist::PersistSink;
use crate::store::ObjectStore;

/// An inverse-operation descriptor.
#[derive(Debug, Clone)]
pub enum UndoOp {
    /// Delete this created object.
    Remove(ObjectId),
    /// Re-create this deleted object with its original fields.
    Recreate(BoardObject),
    /// Overwrite the object with this prior snapshot, wholesale.
    Restore(BoardObject),
    /// One unit, applied in reverse recording order so ops touching the same
    /// object unwind correctly (a create's `Remove` runs after the `Restore`
    /// of a later update to it).
    Batch(Vec<UndoOp>),
}

/// Bounded linear undo/redo stack.
#[derive(Debug, Default)]
pub struct UndoRedoStack {
    undo: Vec<UndoOp>,
    redo: Vec<UndoOp>,
}

impl UndoRedoStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the inverse of a mutation that is about to happen.
    ///
    /// Clears redo and evicts the oldest entry beyond [`UNDO_DEPTH`].
    pub fn record(&mut self, op: UndoOp) {
        self.redo.clear();
        self.undo.push(op);
        if self.undo.len() > UNDO_DEPTH {
            self.undo.remove(0);
        }
    }

    /// Undo the most recent recorded mutation. Returns `false` when there is
    /// nothing to undo.
    pub fn undo<S: PersistSink>(&mut self, store: &mut ObjectStore<S>, now_ms: i64) -> bool {
        let Some(op) = self.undo.pop() else {
            return false;
        };
        let forward = counter_inverse(&op, store);
        apply(&op, store, now_ms);
        self.redo.push(forward);
        true
    }

    /// Redo the most recently undone mutation. Returns `false` when there is
    /// nothing to redo.
    pub fn redo<S: PersistSink>(&mut self, store: &mut ObjectStore<S>, now_ms: i64) -> bool {
        let Some(op) = self.redo.pop() else {
            return false;
        };
        let backward = counter_inverse(&op, store);
        apply(&op, store, now_ms);
        self.undo.push(backward);
        true
    }

    /// Whether an undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether a redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of retained undo descriptors.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.undo.len()
    }
}

/// Build the descriptor that reverses `op`, from the store's current state.
///
/// Captured *before* `op` is applied, so `Restore`/`Remove` snapshots reflect
/// the state being replaced.
fn counter_inverse<S: PersistSink>(op: &UndoOp, store: &ObjectStore<S>) -> UndoOp {
    match op {
        UndoOp::Remove(id) => match store.get(id) {
            Some(obj) => UndoOp::Recreate(obj.clone()),
            // Already gone (e.g. deleted remotely); reversing is a no-op.
            None => UndoOp::Batch(Vec::new()),
        },
        UndoOp::Recreate(obj) => UndoOp::Remove(obj.id),
        UndoOp::Restore(prior) => match store.get(&prior.id) {
            Some(current) => UndoOp::Restore(current.clone()),
            None => UndoOp::Remove(prior.id),
        },
        UndoOp::Batch(ops) => UndoOp::Batch(ops.iter().rev().map(|o| counter_inverse(o, store)).collect()),
    }
}

/// Apply a descriptor through the store's entry points.
///
/// A descriptor whose target vanished in the meantime (deleted by another
/// client) is skipped; partial application is the accepted outcome under
/// last-write-wins.
fn apply<S: PersistSink>(op: &UndoOp, store: &mut ObjectStore<S>, now_ms: i64) {
    match op {
        UndoOp::Remove(id) => {
            store.delete(id);
        }
        UndoOp::Recreate(obj) => {
            let mut obj = obj.clone();
            obj.updated_at = now_ms;
            store.create(obj);
        }
        UndoOp::Restore(prior) => {
            // Wholesale, not a sparse patch: props keys added since the
            // snapshot and a later `parent_frame_id` assignment must not
            // survive the restore.
            let mut obj = prior.clone();
            obj.updated_at = now_ms;
            store.replace(obj);
        }
        UndoOp::Batch(ops) => {
            for inner in ops.iter().rev() {
                apply(inner, store, now_ms);
            }
        }
    }
}
