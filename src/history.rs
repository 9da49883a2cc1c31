//! Append-only activity log shown in the board's history panel.
//!
//! Display-only: nothing replays from here. The backing store keeps
//! `history/{timestamp}` records; each client trims its local copy to the
//! most recent [`HISTORY_CAP`] entries.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use serde::{Deserialize, Serialize};

use crate::consts::HISTORY_CAP;

/// One line in the activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// When it happened, milliseconds since the Unix epoch.
    pub at_ms: i64,
    /// Display name of whoever did it.
    pub user: String,
    /// Human-readable summary ("created 3 sticky notes").
    pub summary: String,
}

/// Capped FIFO of history entries, newest last.
#[derive(Debug, Default)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry, evicting the oldest beyond the cap.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        if self.entries.len() > HISTORY_CAP {
            let excess = self.entries.len() - HISTORY_CAP;
            self.entries.drain(..excess);
        }
    }

    /// Entries oldest-first.
    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
