//! Merged object store: authoritative remote snapshot + optimistic local
//! overlay.
//!
//! DESIGN
//! ======
//! The backing store pushes full snapshots (no delta protocol), which replace
//! `remote` wholesale. Unconfirmed local writes live in `pending`, and the
//! visible board is the per-id merge of the two: a pending entry wins for its
//! id until a push containing that id arrives, at which point the pending
//! entry is dropped and remote owns the id again. This is what makes callers
//! observe their own writes immediately while keeping remote authoritative
//! once it has caught up.
//!
//! Persistence is optimistic forever: every mutation is applied to the
//! visible state synchronously and submitted to the [`PersistSink`] as a
//! fire-and-forget request. A failed write only flips the advisory
//! [`SaveStatus`]; nothing is ever rolled back. Concurrent writers resolve by
//! last-write-wins — an explicit tradeoff, not an omission.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;

use log::debug;

use crate::notify::Broadcaster;
use crate::object::{BoardObject, ObjectId, PartialBoardObject};
use crate::persist::{PersistOp, PersistSink, SaveStatus};

/// An unconfirmed local write.
#[derive(Debug, Clone)]
enum Pending {
    /// Object created or updated locally; shadows the remote record.
    Write(BoardObject),
    /// Object deleted locally; hides the remote record.
    Tombstone,
}

/// The merged object store. All board mutation goes through its entry points;
/// presence and edit-lock maps are advisory and never gate these.
pub struct ObjectStore<S: PersistSink> {
    remote: HashMap<ObjectId, BoardObject>,
    pending: HashMap<ObjectId, Pending>,
    sink: S,
    in_flight: usize,
    save_status: SaveStatus,
    status_events: Broadcaster<SaveStatus>,
}

impl<S: PersistSink> ObjectStore<S> {
    /// Create an empty store writing through `sink`.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self {
            remote: HashMap::new(),
            pending: HashMap::new(),
            sink,
            in_flight: 0,
            save_status: SaveStatus::Saved,
            status_events: Broadcaster::new(),
        }
    }

    // ── Merged view ─────────────────────────────────────────────

    /// Look up an object in the merged view.
    #[must_use]
    pub fn get(&self, id: &ObjectId) -> Option<&BoardObject> {
        match self.pending.get(id) {
            Some(Pending::Write(obj)) => Some(obj),
            Some(Pending::Tombstone) => None,
            None => self.remote.get(id),
        }
    }

    /// Whether an object is visible in the merged view.
    #[must_use]
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// All visible objects, in no particular order.
    #[must_use]
    pub fn objects(&self) -> Vec<&BoardObject> {
        let mut out: Vec<&BoardObject> = Vec::with_capacity(self.remote.len() + self.pending.len());
        for (id, obj) in &self.remote {
            if !self.pending.contains_key(id) {
                out.push(obj);
            }
        }
        for entry in self.pending.values() {
            if let Pending::Write(obj) = entry {
                out.push(obj);
            }
        }
        out
    }

    /// All visible object ids.
    #[must_use]
    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.objects().iter().map(|o| o.id).collect()
    }

    /// Number of visible objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects().len()
    }

    /// Returns `true` if the merged view contains no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ── Mutation entry points ───────────────────────────────────

    /// Create an object: visible immediately, persisted asynchronously.
    pub fn create(&mut self, obj: BoardObject) -> ObjectId {
        let id = obj.id;
        self.pending.insert(id, Pending::Write(obj.clone()));
        self.submit(PersistOp::Upsert { object: obj });
        id
    }

    /// Overwrite an object's full record (or recreate it if it vanished):
    /// visible immediately, persisted as a whole-object upsert.
    ///
    /// Unlike [`update`](Self::update), no merge happens — props keys absent
    /// from `obj` are gone and `parent_frame_id` is taken as-is. This is the
    /// undo path for prior-snapshot restores.
    pub fn replace(&mut self, obj: BoardObject) {
        self.pending.insert(obj.id, Pending::Write(obj.clone()));
        self.submit(PersistOp::Upsert { object: obj });
    }

    /// Merge a sparse update into an object and persist the patch.
    ///
    /// Returns `false` (and persists nothing) when the id is not visible.
    pub fn update(&mut self, id: &ObjectId, fields: &PartialBoardObject, now_ms: i64) -> bool {
        let Some(current) = self.get(id) else {
            return false;
        };
        let mut next = current.clone();
        fields.apply_to(&mut next);
        next.updated_at = now_ms;
        self.pending.insert(*id, Pending::Write(next));
        self.submit(PersistOp::Patch { id: *id, fields: fields.clone() });
        true
    }

    /// Delete an object: hidden immediately, removed from the backing store
    /// asynchronously. Returns the object as it was, for undo capture.
    pub fn delete(&mut self, id: &ObjectId) -> Option<BoardObject> {
        let prior = self.get(id).cloned()?;
        self.pending.insert(*id, Pending::Tombstone);
        self.submit(PersistOp::Delete { id: *id });
        Some(prior)
    }

    /// Apply a local-only patch with no durable write.
    ///
    /// Used for high-frequency visual staging (drag frames); the caller is
    /// responsible for issuing a coalesced [`update`](Self::update) or
    /// [`persist_position`](Self::persist_position) for durability.
    pub fn stage(&mut self, id: &ObjectId, fields: &PartialBoardObject) -> bool {
        let Some(current) = self.get(id) else {
            return false;
        };
        let mut next = current.clone();
        fields.apply_to(&mut next);
        self.pending.insert(*id, Pending::Write(next));
        true
    }

    /// Persist the currently-staged position of an object without touching
    /// the visible state again. No-op when the id is not visible.
    pub fn persist_position(&mut self, id: &ObjectId, now_ms: i64) {
        let Some(obj) = self.get(id) else {
            return;
        };
        let fields = PartialBoardObject::position(obj.x, obj.y);
        if let Some(Pending::Write(staged)) = self.pending.get_mut(id) {
            staged.updated_at = now_ms;
        }
        self.submit(PersistOp::Patch { id: *id, fields });
    }

    // ── Remote pushes ───────────────────────────────────────────

    /// Apply a full server push: drop confirmed pending entries, then replace
    /// `remote` wholesale.
    ///
    /// A pending entry for id X is confirmed (dropped) the moment a push
    /// contains X — even if the pushed record is older than the local write.
    /// A stale write landing after a newer one is an accepted race of the
    /// last-write-wins model.
    pub fn apply_snapshot(&mut self, objects: Vec<BoardObject>) {
        let pending_before = self.pending.len();
        for obj in &objects {
            self.pending.remove(&obj.id);
        }
        debug!(
            "snapshot: {} objects, pending {} -> {}",
            objects.len(),
            pending_before,
            self.pending.len()
        );
        self.remote.clear();
        for obj in objects {
            self.remote.insert(obj.id, obj);
        }
    }

    // ── Save status ─────────────────────────────────────────────

    /// Current advisory save state.
    #[must_use]
    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    /// Broadcaster of save-status transitions, for the sync indicator.
    #[must_use]
    pub fn status_events(&self) -> Broadcaster<SaveStatus> {
        self.status_events.clone()
    }

    /// Report one settled persistence request.
    ///
    /// `ok = false` flips the advisory status to [`SaveStatus::Error`] but
    /// leaves the optimistic state untouched.
    pub fn persist_settled(&mut self, ok: bool) {
        self.in_flight = self.in_flight.saturating_sub(1);
        // A later success clears a previous error once the queue drains.
        let next = if !ok {
            SaveStatus::Error
        } else if self.in_flight > 0 {
            SaveStatus::Saving
        } else {
            SaveStatus::Saved
        };
        self.set_status(next);
    }

    /// Borrow the sink (tests inspect recorded ops through this).
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn submit(&mut self, op: PersistOp) {
        self.in_flight += 1;
        self.sink.submit(op);
        self.set_status(SaveStatus::Saving);
    }

    fn set_status(&mut self, next: SaveStatus) {
        if next != self.save_status {
            self.save_status = next;
            self.status_events.publish(&next);
        }
    }
}

/// Debounce buffer for text edits: at most one durable write per
/// [`crate::consts::TEXT_DEBOUNCE_MS`] of inactivity, with an unconditional
/// flush on blur.
#[derive(Debug, Default)]
pub struct TextEditBuffer {
    entries: HashMap<ObjectId, (String, i64)>,
}

impl TextEditBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a keystroke's resulting text; restarts the idle window.
    pub fn record(&mut self, id: ObjectId, text: impl Into<String>, now_ms: i64) {
        self.entries.insert(id, (text.into(), now_ms));
    }

    /// Drain entries whose idle window has elapsed.
    pub fn take_due(&mut self, now_ms: i64) -> Vec<(ObjectId, String)> {
        let due: Vec<ObjectId> = self
            .entries
            .iter()
            .filter(|(_, (_, last))| now_ms - last >= crate::consts::TEXT_DEBOUNCE_MS)
            .map(|(id, _)| *id)
            .collect();
        due.into_iter()
            .filter_map(|id| self.entries.remove(&id).map(|(text, _)| (id, text)))
            .collect()
    }

    /// Drain one object's entry immediately (editor blur).
    pub fn flush(&mut self, id: &ObjectId) -> Option<(ObjectId, String)> {
        self.entries.remove(id).map(|(text, _)| (*id, text))
    }

    /// Drain everything immediately (session teardown).
    pub fn flush_all(&mut self) -> Vec<(ObjectId, String)> {
        self.entries.drain().map(|(id, (text, _))| (id, text)).collect()
    }

    /// Whether any edit is still buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
