//! Presence tracking: live cursors, online roster, selection broadcast,
//! camera-follow, and advisory per-object edit locks.
//!
//! Outbound traffic is bounded by two cadences: the local cursor publishes at
//! most every [`CURSOR_PUBLISH_INTERVAL_MS`] (latest sample wins) and the
//! local selection at most every [`SELECTION_PUBLISH_INTERVAL_MS`]. Inbound
//! cursors are suppressed until they move at least once after first being
//! observed, which keeps stale positions from ghosting on reconnect, and hide
//! again after [`CURSOR_HIDE_TIMEOUT_MS`] without movement.
//!
//! Everything here is advisory. Edit locks render as a dashed-border warning
//! and never block a conflicting write.

#[cfg(test)]
#[path = "presence_test.rs"]
mod presence_test;

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::consts::{
    CURSOR_HIDE_TIMEOUT_MS, CURSOR_PUBLISH_INTERVAL_MS, PRESENCE_OFFLINE_TIMEOUT_MS,
    SELECTION_PUBLISH_INTERVAL_MS,
};
use crate::object::ObjectId;

/// Identifier of a remote session (user or client id string).
pub type UserId = String;

/// A cursor position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPos {
    pub x: f64,
    pub y: f64,
}

/// Per-session ephemeral presence record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceEntry {
    /// Name shown next to the cursor and in the roster.
    pub display_name: String,
    /// Whether the session is currently connected. Disconnect flips this to
    /// `false` rather than deleting the entry, so "last seen" stays visible.
    pub online: bool,
    /// Last heartbeat, milliseconds since the Unix epoch.
    pub last_seen: i64,
    /// Most recent cursor position, if any has been observed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorPos>,
    /// Objects this session has selected.
    #[serde(default)]
    pub selected_object_ids: Vec<ObjectId>,
    /// Object this session is actively editing, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editing_object_id: Option<ObjectId>,
}

/// Advisory record of another session's in-progress edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveEdit {
    /// Session holding the advisory lock.
    pub user_id: UserId,
    /// When the edit began, milliseconds since the Unix epoch.
    pub since_ms: i64,
}

/// Movement bookkeeping for one remote cursor.
#[derive(Debug, Clone, Copy)]
struct CursorMeta {
    has_moved: bool,
    last_moved_ms: i64,
}

/// Tracks everything presence-related for one board session.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    entries: HashMap<UserId, PresenceEntry>,
    cursor_meta: HashMap<UserId, CursorMeta>,
    active_edits: HashMap<ObjectId, ActiveEdit>,
    follow: Option<UserId>,

    pending_cursor: Option<CursorPos>,
    last_cursor_publish_ms: Option<i64>,
    pending_selection: Option<Vec<ObjectId>>,
    last_selection_publish_ms: Option<i64>,
}

impl PresenceTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ── Outbound cadences ───────────────────────────────────────

    /// Record the local cursor position. Cheap: just replaces the pending
    /// sample; the publish decision happens in [`take_cursor_publish`].
    ///
    /// [`take_cursor_publish`]: Self::take_cursor_publish
    pub fn record_local_cursor(&mut self, x: f64, y: f64) {
        self.pending_cursor = Some(CursorPos { x, y });
    }

    /// Take the latest cursor sample if the publish interval has elapsed.
    ///
    /// Returns `None` when there is nothing new or the cadence would be
    /// exceeded; raw pointer events therefore never map 1:1 to writes.
    pub fn take_cursor_publish(&mut self, now_ms: i64) -> Option<CursorPos> {
        let sample = self.pending_cursor?;
        if let Some(last) = self.last_cursor_publish_ms {
            if now_ms - last < CURSOR_PUBLISH_INTERVAL_MS {
                return None;
            }
        }
        self.pending_cursor = None;
        self.last_cursor_publish_ms = Some(now_ms);
        Some(sample)
    }

    /// Record the local selection for debounced broadcast.
    pub fn record_local_selection(&mut self, ids: Vec<ObjectId>) {
        self.pending_selection = Some(ids);
    }

    /// Take the latest selection if the (slower) publish interval has elapsed.
    pub fn take_selection_publish(&mut self, now_ms: i64) -> Option<Vec<ObjectId>> {
        self.pending_selection.as_ref()?;
        if let Some(last) = self.last_selection_publish_ms {
            if now_ms - last < SELECTION_PUBLISH_INTERVAL_MS {
                return None;
            }
        }
        self.last_selection_publish_ms = Some(now_ms);
        self.pending_selection.take()
    }

    // ── Inbound presence ────────────────────────────────────────

    /// Upsert a roster entry from a presence push or heartbeat.
    pub fn apply_remote_presence(&mut self, user_id: &str, display_name: &str, online: bool, last_seen: i64) {
        let entry = self
            .entries
            .entry(user_id.to_owned())
            .or_insert_with(|| PresenceEntry {
                display_name: display_name.to_owned(),
                online,
                last_seen,
                cursor: None,
                selected_object_ids: Vec::new(),
                editing_object_id: None,
            });
        entry.display_name = display_name.to_owned();
        entry.online = online;
        entry.last_seen = last_seen;
    }

    /// Apply a remote cursor sample.
    ///
    /// The first observation seeds the position without making the cursor
    /// visible; only a subsequent change marks it as moving.
    pub fn apply_remote_cursor(&mut self, user_id: &str, x: f64, y: f64, now_ms: i64) {
        let next = CursorPos { x, y };
        let previous = self.entries.get(user_id).and_then(|e| e.cursor);
        if let Some(entry) = self.entries.get_mut(user_id) {
            entry.cursor = Some(next);
        } else {
            // Cursor arrived before the presence record; hold the position
            // under a placeholder entry until the roster catches up.
            self.entries.insert(
                user_id.to_owned(),
                PresenceEntry {
                    display_name: String::new(),
                    online: true,
                    last_seen: now_ms,
                    cursor: Some(next),
                    selected_object_ids: Vec::new(),
                    editing_object_id: None,
                },
            );
        }
        let meta = self
            .cursor_meta
            .entry(user_id.to_owned())
            .or_insert(CursorMeta { has_moved: false, last_moved_ms: now_ms });
        if previous.is_some_and(|p| p != next) {
            meta.has_moved = true;
            meta.last_moved_ms = now_ms;
        }
    }

    /// Apply a remote selection broadcast.
    pub fn apply_remote_selection(&mut self, user_id: &str, ids: Vec<ObjectId>) {
        if let Some(entry) = self.entries.get_mut(user_id) {
            entry.selected_object_ids = ids;
        }
    }

    /// Handle a session disconnect: the roster entry goes offline but keeps
    /// its `last_seen`; the cursor and any advisory locks are dropped.
    pub fn remove_session(&mut self, user_id: &str) {
        if let Some(entry) = self.entries.get_mut(user_id) {
            entry.online = false;
            entry.cursor = None;
            entry.editing_object_id = None;
        }
        self.cursor_meta.remove(user_id);
        self.active_edits.retain(|_, edit| edit.user_id != user_id);
        if self.follow.as_deref() == Some(user_id) {
            debug!("follow target {user_id} disconnected");
            self.follow = None;
        }
    }

    /// Cursors that should render: moved at least once since first observed,
    /// and moved within the hide timeout.
    #[must_use]
    pub fn visible_cursors(&self, now_ms: i64) -> Vec<(&str, CursorPos)> {
        self.entries
            .iter()
            .filter_map(|(id, entry)| {
                let cursor = entry.cursor?;
                let meta = self.cursor_meta.get(id)?;
                (meta.has_moved && now_ms - meta.last_moved_ms <= CURSOR_HIDE_TIMEOUT_MS)
                    .then_some((id.as_str(), cursor))
            })
            .collect()
    }

    /// Roster entries still considered online: flagged online and heard from
    /// within the offline timeout.
    #[must_use]
    pub fn online_roster(&self, now_ms: i64) -> Vec<(&str, &PresenceEntry)> {
        self.entries
            .iter()
            .filter(|(_, e)| e.online && now_ms - e.last_seen <= PRESENCE_OFFLINE_TIMEOUT_MS)
            .map(|(id, e)| (id.as_str(), e))
            .collect()
    }

    /// Look up a presence entry.
    #[must_use]
    pub fn entry(&self, user_id: &str) -> Option<&PresenceEntry> {
        self.entries.get(user_id)
    }

    // ── Follow mode ─────────────────────────────────────────────

    /// Start tracking a remote user's cursor with the viewport.
    pub fn follow(&mut self, user_id: &str) {
        self.follow = Some(user_id.to_owned());
    }

    /// The position the viewport should track, while following.
    #[must_use]
    pub fn follow_target(&self) -> Option<CursorPos> {
        let user_id = self.follow.as_ref()?;
        self.entries.get(user_id).and_then(|e| e.cursor)
    }

    /// Who is being followed, if anyone.
    #[must_use]
    pub fn following(&self) -> Option<&str> {
        self.follow.as_deref()
    }

    /// A local pan or drag cancels follow mode.
    pub fn notice_local_pan(&mut self) {
        if self.follow.take().is_some() {
            debug!("follow cancelled by local pan");
        }
    }

    // ── Advisory edit locks ─────────────────────────────────────

    /// Mark an object as being edited by a session. Informational only.
    pub fn set_editing(&mut self, object_id: ObjectId, user_id: &str, now_ms: i64) {
        self.active_edits
            .insert(object_id, ActiveEdit { user_id: user_id.to_owned(), since_ms: now_ms });
        if let Some(entry) = self.entries.get_mut(user_id) {
            entry.editing_object_id = Some(object_id);
        }
    }

    /// Clear an object's advisory lock if held by the given session.
    pub fn clear_editing(&mut self, object_id: &ObjectId, user_id: &str) {
        if self.active_edits.get(object_id).is_some_and(|e| e.user_id == user_id) {
            self.active_edits.remove(object_id);
        }
        if let Some(entry) = self.entries.get_mut(user_id) {
            if entry.editing_object_id.as_ref() == Some(object_id) {
                entry.editing_object_id = None;
            }
        }
    }

    /// The advisory lock on an object, if any.
    #[must_use]
    pub fn editing(&self, object_id: &ObjectId) -> Option<&ActiveEdit> {
        self.active_edits.get(object_id)
    }
}
