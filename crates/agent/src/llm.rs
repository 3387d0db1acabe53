use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use outfitter_core::Message;

/// Declaration of one callable tool, in the JSON-schema shape chat-completion
/// APIs expect for function binding.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool call the capability asked for. `arguments` is whatever JSON the
/// model produced; typed decoding happens at dispatch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LlmReply {
    Text(String),
    ToolCalls(Vec<ToolCallRequest>),
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum LlmError {
    #[error("language capability transport failure: {0}")]
    Transport(String),
    #[error("language capability returned a malformed payload: {0}")]
    Malformed(String),
}

/// The opaque language capability: given a message sequence (and optionally a
/// bound toolset), return text or a tool-call decision. Callers own all
/// failure handling; nothing in this crate lets an `LlmError` escape a turn.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<LlmReply, LlmError>;
}
