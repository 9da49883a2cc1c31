#![allow(clippy::cast_possible_wrap)]

use super::*;
use crate::consts::HISTORY_CAP;

fn entry(at_ms: i64, summary: &str) -> HistoryEntry {
    HistoryEntry { at_ms, user: "Dana".into(), summary: summary.into() }
}

#[test]
fn entries_are_kept_oldest_first() {
    let mut log = HistoryLog::new();
    assert!(log.is_empty());

    log.push(entry(1, "created a frame"));
    log.push(entry(2, "moved 3 objects"));
    assert_eq!(log.len(), 2);
    assert_eq!(log.entries()[0].summary, "created a frame");
    assert_eq!(log.entries()[1].at_ms, 2);
}

#[test]
fn log_evicts_oldest_beyond_the_cap() {
    let mut log = HistoryLog::new();
    for i in 0..(HISTORY_CAP as i64 + 25) {
        log.push(entry(i, "edit"));
    }
    assert_eq!(log.len(), HISTORY_CAP);
    assert_eq!(log.entries()[0].at_ms, 25);
    assert_eq!(log.entries().last().unwrap().at_ms, HISTORY_CAP as i64 + 24);
}

#[test]
fn entry_round_trips_with_camel_case_keys() {
    let value = serde_json::to_value(entry(1_700_000_000_000, "cleared the board")).unwrap();
    assert_eq!(value["atMs"], 1_700_000_000_000_i64);
    assert_eq!(value["user"], "Dana");

    let back: HistoryEntry = serde_json::from_value(value).unwrap();
    assert_eq!(back.summary, "cleared the board");
}
