//! Transcript model and read-only inspection helpers.
//!
//! Transcripts are produced externally by a rollout and frozen before
//! scoring; everything here is a pure function over the message sequence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One message in a transcript. `tool_calls` carries opaque tool-call
/// descriptors on assistant messages; the engine never looks inside them,
/// only at their presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<Value>>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }

    pub fn with_tool_calls(mut self, calls: Vec<Value>) -> Self {
        self.tool_calls = Some(calls);
        self
    }
}

pub type Transcript = Vec<Message>;

/// Content of the most recent assistant message, or empty string.
pub fn last_assistant_content(transcript: &[Message]) -> String {
    transcript
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content.clone().unwrap_or_default())
        .unwrap_or_default()
}

/// Trimmed content of the last tool message preceding the final assistant
/// message. Empty string if there is no assistant message or no tool
/// message before it.
pub fn last_tool_content_before_final_assistant(transcript: &[Message]) -> String {
    let Some(last_assistant) = transcript.iter().rposition(|m| m.role == Role::Assistant) else {
        return String::new();
    };
    transcript[..last_assistant]
        .iter()
        .rev()
        .find(|m| m.role == Role::Tool)
        .map(|m| m.content.as_deref().unwrap_or_default().trim().to_string())
        .unwrap_or_default()
}

/// True if the agent used or attempted to use a tool anywhere in the
/// transcript: either a tool-role result message, or an assistant message
/// carrying a non-empty tool-call list (an attempted call with no visible
/// result still counts).
pub fn any_tool_call_occurred(transcript: &[Message]) -> bool {
    transcript.iter().any(|m| {
        m.role == Role::Tool
            || (m.role == Role::Assistant
                && m.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty()))
    })
}
