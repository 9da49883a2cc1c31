use serde_json::json;

use super::*;
use crate::object::{BoardObject, ObjectKind};

// =============================================================
// Wire format
// =============================================================

#[test]
fn request_serializes_with_camel_case_board_state() {
    let board = vec![BoardObject::new(ObjectKind::Sticky, 10.0, 20.0, 180.0, 180.0, json!({"text": "hi"}), 5)];
    let request = AgentRequest {
        messages: vec![AgentMessage::user("add a sticky note")],
        model: "claude-sonnet".into(),
        board_state: board,
    };

    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["model"], "claude-sonnet");
    assert_eq!(value["messages"][0]["role"], "user");
    assert!(value["boardState"].is_array());
    assert_eq!(value["boardState"][0]["kind"], "sticky");
}

#[test]
fn response_actions_are_optional() {
    let response: AgentResponse = serde_json::from_value(json!({
        "message": { "role": "assistant", "content": "done" },
    }))
    .unwrap();
    assert!(response.actions.is_none());

    let response: AgentResponse = serde_json::from_value(json!({
        "message": { "role": "assistant", "content": "created two notes" },
        "actions": [
            { "type": "createStickyNote", "text": "A" },
            { "type": "createStickyNote", "text": "B" },
        ],
    }))
    .unwrap();
    assert_eq!(response.actions.unwrap().len(), 2);
}

#[test]
fn message_constructors_set_roles() {
    assert_eq!(AgentMessage::user("q").role, "user");
    assert_eq!(AgentMessage::assistant("a").role, "assistant");
}

// =============================================================
// Turn-budget fallback
// =============================================================

#[test]
fn fallback_reply_reports_partial_progress() {
    let none = fallback_reply(0);
    assert_eq!(none.role, "assistant");
    assert!(none.content.contains("try again"));

    let one = fallback_reply(1);
    assert!(one.content.contains("1 board change went through"));

    let many = fallback_reply(5);
    assert!(many.content.contains("5 board changes went through"));
}
