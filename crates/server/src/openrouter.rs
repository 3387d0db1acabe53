use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use outfitter_agent::llm::{LlmClient, LlmError, LlmReply, ToolCallRequest, ToolSchema};
use outfitter_core::config::LlmConfig;
use outfitter_core::{Message, MessageRole};

/// OpenAI-compatible chat-completions client pointed at OpenRouter (or any
/// gateway speaking the same protocol). Transport and shape problems surface
/// as [`LlmError`]; every consumer in the agent crate degrades on them.
pub struct OpenRouterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_retries: u32,
}

impl OpenRouterClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|error| LlmError::Transport(error.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.as_ref().map(|key| key.expose_secret().to_string()),
            model: config.model.clone(),
            max_retries: config.max_retries,
        })
    }

    fn request_body(&self, messages: &[Message], tools: Option<&[ToolSchema]>) -> Value {
        let mut body = json!({
            "model": self.model,
            "temperature": 0.1,
            "messages": messages.iter().map(wire_message).collect::<Vec<_>>(),
        });

        if let Some(tools) = tools {
            if !tools.is_empty() {
                body["tools"] = Value::Array(tools.iter().map(wire_tool).collect());
            }
        }

        body
    }

    async fn send(&self, body: &Value) -> Result<Value, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut last_error = LlmError::Transport("no attempts made".to_string());

        for _attempt in 0..=self.max_retries {
            let mut request = self.http.post(&url).json(body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<Value>()
                        .await
                        .map_err(|error| LlmError::Malformed(error.to_string()));
                }
                Ok(response) => {
                    last_error = LlmError::Transport(format!(
                        "chat completions returned {}",
                        response.status()
                    ));
                }
                Err(error) => {
                    last_error = LlmError::Transport(error.to_string());
                }
            }
        }

        Err(last_error)
    }

    fn parse_reply(payload: &Value) -> Result<LlmReply, LlmError> {
        let message = payload
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .ok_or_else(|| LlmError::Malformed("response carries no choices".to_string()))?;

        if let Some(calls) = message.get("tool_calls").and_then(Value::as_array) {
            if !calls.is_empty() {
                let requests = calls
                    .iter()
                    .map(parse_tool_call)
                    .collect::<Result<Vec<_>, LlmError>>()?;
                return Ok(LlmReply::ToolCalls(requests));
            }
        }

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| LlmError::Malformed("message carries no content".to_string()))?;
        Ok(LlmReply::Text(content.to_string()))
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let payload = self.send(&self.request_body(messages, None)).await?;
        match Self::parse_reply(&payload)? {
            LlmReply::Text(text) => Ok(text),
            LlmReply::ToolCalls(_) => {
                Err(LlmError::Malformed("tool calls returned with no toolset bound".to_string()))
            }
        }
    }

    async fn complete_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
    ) -> Result<LlmReply, LlmError> {
        let payload = self.send(&self.request_body(messages, Some(tools))).await?;
        Self::parse_reply(&payload)
    }
}

/// Map a domain message onto the chat-completions wire shape. Tool-call
/// records and tool results carry the ids the protocol requires.
fn wire_message(message: &Message) -> Value {
    match message.role {
        MessageRole::User => json!({ "role": "user", "content": message.content }),
        MessageRole::Agent => {
            let tool_calls = message
                .payload
                .as_ref()
                .and_then(|payload| payload.get("tool_calls"))
                .and_then(Value::as_array);

            match tool_calls {
                Some(calls) if !calls.is_empty() => json!({
                    "role": "assistant",
                    "content": message.content,
                    "tool_calls": calls.iter().map(wire_tool_call).collect::<Vec<_>>(),
                }),
                _ => json!({ "role": "assistant", "content": message.content }),
            }
        }
        MessageRole::ToolResult => {
            let call_id = message
                .payload
                .as_ref()
                .and_then(|payload| payload.get("call_id"))
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            json!({
                "role": "tool",
                "tool_call_id": call_id,
                "content": message.content,
            })
        }
    }
}

fn wire_tool(tool: &ToolSchema) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

fn wire_tool_call(call: &Value) -> Value {
    let arguments = call.get("arguments").cloned().unwrap_or_else(|| json!({}));
    json!({
        "id": call.get("id").and_then(Value::as_str).unwrap_or("unknown"),
        "type": "function",
        "function": {
            "name": call.get("name").and_then(Value::as_str).unwrap_or(""),
            "arguments": arguments.to_string(),
        }
    })
}

fn parse_tool_call(call: &Value) -> Result<ToolCallRequest, LlmError> {
    let function = call
        .get("function")
        .ok_or_else(|| LlmError::Malformed("tool call carries no function".to_string()))?;
    let name = function
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| LlmError::Malformed("tool call carries no name".to_string()))?;

    let arguments = match function.get("arguments") {
        Some(Value::String(raw)) => serde_json::from_str(raw).unwrap_or_else(|_| json!({})),
        Some(value) => value.clone(),
        None => json!({}),
    };

    Ok(ToolCallRequest {
        id: call.get("id").and_then(Value::as_str).unwrap_or("unknown").to_string(),
        name: name.to_string(),
        arguments,
    })
}
