use std::sync::Arc;

use serde_json::json;

use outfitter_core::{AgentResponse, Message};

use crate::llm::{LlmClient, LlmReply, ToolSchema};
use crate::tools::ToolExecutor;

const DEGRADED_REPLY: &str =
    "I'm having trouble reaching our product systems right now. Please try again in a moment.";

/// The shared bounded tool loop behind the concierge and support
/// specialists: at most one round of tool execution, at most two capability
/// invocations, and a valid text response on every path.
pub struct ToolLoopHandler {
    llm: Arc<dyn LlmClient>,
    executor: ToolExecutor,
    system_prompt: String,
    toolset: Vec<ToolSchema>,
}

impl ToolLoopHandler {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        executor: ToolExecutor,
        system_prompt: String,
        toolset: Vec<ToolSchema>,
    ) -> Self {
        Self { llm, executor, system_prompt, toolset }
    }

    /// Returns the tool transcript to append to the session log plus the
    /// final reply. The second capability call is made without the toolset
    /// bound, so a second round of tool calls is structurally impossible.
    pub async fn run(&self, log: &[Message]) -> (Vec<Message>, AgentResponse) {
        let mut prompt_log = Vec::with_capacity(log.len() + 1);
        prompt_log.push(Message::user(self.system_prompt.clone()));
        prompt_log.extend_from_slice(log);

        let reply = match self.llm.complete_with_tools(&prompt_log, &self.toolset).await {
            Ok(reply) => reply,
            Err(error) => {
                tracing::warn!(
                    event_name = "agent.tool_loop.first_pass_failed",
                    error = %error,
                    "capability failed before tool selection, degrading"
                );
                return (Vec::new(), AgentResponse::text(DEGRADED_REPLY));
            }
        };

        let calls = match reply {
            LlmReply::Text(text) => return (Vec::new(), AgentResponse::text(text)),
            LlmReply::ToolCalls(calls) => calls,
        };

        let requested: Vec<&str> = calls.iter().map(|call| call.name.as_str()).collect();
        let mut transcript = vec![Message::agent_with_payload(
            format!("requested tools: {}", requested.join(", ")),
            json!({ "tool_calls": &calls }),
        )];

        for call in &calls {
            // Identity resolves against THIS handler's bound set; a tool that
            // exists elsewhere is still "not found" here.
            let message = if self.toolset.iter().any(|tool| tool.name == call.name) {
                self.executor.execute(call).await
            } else {
                Message::tool_result(
                    format!("Error: tool not found: `{}` is not part of this toolset", call.name),
                    json!({ "tool": call.name, "call_id": call.id }),
                )
            };
            transcript.push(message);
        }

        let mut augmented_log = prompt_log;
        augmented_log.extend(transcript.iter().cloned());

        let response = match self.llm.complete(&augmented_log).await {
            Ok(text) => AgentResponse::text(text),
            Err(error) => {
                tracing::warn!(
                    event_name = "agent.tool_loop.second_pass_failed",
                    error = %error,
                    "capability failed after tool execution, degrading"
                );
                AgentResponse::text(DEGRADED_REPLY)
            }
        };

        (transcript, response)
    }
}
