use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Agent,
    ToolResult,
}

/// One entry in a session's conversation log. The log is append-only; the
/// latest message is what routing keys off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into(), payload: None }
    }

    pub fn agent(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Agent, content: content.into(), payload: None }
    }

    pub fn agent_with_payload(content: impl Into<String>, payload: Value) -> Self {
        Self { role: MessageRole::Agent, content: content.into(), payload: Some(payload) }
    }

    pub fn tool_result(content: impl Into<String>, payload: Value) -> Self {
        Self { role: MessageRole::ToolResult, content: content.into(), payload: Some(payload) }
    }
}
