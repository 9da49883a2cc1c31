//! Agent HTTP contract: request/response types and the turn-budget fallback.
//!
//! The natural-language agent is an external collaborator reached over HTTP.
//! It receives the conversation plus a board-state snapshot and replies with
//! narrative text and, optionally, a batch of [`Action`]s in the same tagged
//! schema the interpreter consumes. The agent reorders creates-before-layout
//! and injects template content fallbacks on its own side; the interpreter
//! repeats both as a defense-in-depth pass, so neither layer depends on the
//! other being correct.

#[cfg(test)]
#[path = "agent_test.rs"]
mod agent_test;

use serde::{Deserialize, Serialize};

use crate::actions::Action;
use crate::object::BoardObject;

/// One message in the agent conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    /// `"user"`, `"assistant"`, or `"system"`.
    pub role: String,
    /// Plain text content.
    pub content: String,
}

impl AgentMessage {
    /// A user-authored message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }

    /// An assistant-authored message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".into(), content: content.into() }
    }
}

/// Request body sent to the agent endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    /// Conversation so far, oldest first.
    pub messages: Vec<AgentMessage>,
    /// Model identifier to route to.
    pub model: String,
    /// Snapshot of the visible board, so the agent can reference real ids.
    pub board_state: Vec<BoardObject>,
}

/// Response body returned by the agent endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    /// Narrative reply to show in the chat panel.
    pub message: AgentMessage,
    /// Board actions to run through the interpreter, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,
}

/// Synthesize the reply shown when the agent's turn budget ran out before it
/// produced narrative text. Actions executed up to that point are kept.
#[must_use]
pub fn fallback_reply(executed_actions: usize) -> AgentMessage {
    let content = if executed_actions == 0 {
        "I ran out of time before finishing that request. Please try again.".to_owned()
    } else {
        format!(
            "I ran out of time mid-way, but {executed_actions} board \
             change{} went through.",
            if executed_actions == 1 { "" } else { "s" }
        )
    };
    AgentMessage::assistant(content)
}
