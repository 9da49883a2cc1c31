//! Persistence seam between the in-memory store and the backing service.
//!
//! The store never talks to the network directly. Every durable effect is
//! expressed as a [`PersistOp`] and handed to the injected [`PersistSink`],
//! which forwards it asynchronously (fire-and-forget from the store's point of
//! view). The host reports completion back through
//! [`crate::store::ObjectStore::persist_settled`], which only flips the
//! advisory [`SaveStatus`] — failed writes are never rolled back.

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use serde::{Deserialize, Serialize};

use crate::object::{BoardObject, ObjectId, PartialBoardObject};

/// A durable effect requested by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PersistOp {
    /// Write the full object record.
    Upsert {
        /// Object to write.
        object: BoardObject,
    },
    /// Merge a sparse update into the object record.
    Patch {
        /// Target object.
        id: ObjectId,
        /// Fields to merge.
        fields: PartialBoardObject,
    },
    /// Remove the object record.
    Delete {
        /// Target object.
        id: ObjectId,
    },
}

impl PersistOp {
    /// The object this op targets.
    #[must_use]
    pub fn object_id(&self) -> ObjectId {
        match self {
            Self::Upsert { object } => object.id,
            Self::Patch { id, .. } | Self::Delete { id } => *id,
        }
    }
}

/// Receives persistence requests from the store.
///
/// Implementations must not block: submission is a queue handoff, and the
/// actual network round trip happens on the host's event loop. Tests use a
/// recording sink to assert on emitted ops.
pub trait PersistSink {
    /// Accept one durable-write request.
    fn submit(&mut self, op: PersistOp);
}

/// A sink that discards every op. Useful for read-only or scratch stores.
#[derive(Debug, Default)]
pub struct NullSink;

impl PersistSink for NullSink {
    fn submit(&mut self, _op: PersistOp) {}
}

/// A sink that records every op in order, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// Every submitted op, oldest first.
    pub ops: Vec<PersistOp>,
}

impl PersistSink for RecordingSink {
    fn submit(&mut self, op: PersistOp) {
        self.ops.push(op);
    }
}

/// Advisory save state surfaced next to the board, never gating mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    /// Every submitted write has settled successfully.
    #[default]
    Saved,
    /// At least one write is still in flight.
    Saving,
    /// The most recent settled write failed; local state is kept as-is.
    Error,
}
