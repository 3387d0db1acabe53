use std::sync::Arc;

use serde_json::Value;

use outfitter_core::{Message, RouteDecision, Specialist};

use crate::llm::LlmClient;

const ROUTER_INSTRUCTIONS: &str = r#"You are the supervisor for a premium outdoor gear storefront.
Your job is to route the shopper to the correct specialist.

SPECIALISTS:
- concierge: product discovery and recommendations, "show me...", "I need...".
- researcher: deep comparisons, specific specs, "is X better than Y?", reviews.
- support: post-purchase issues, order status, returns, shipping policy.
- transactional: ONLY if the shopper explicitly says "buy", "checkout", "add to cart".

Reply with a JSON object: {"next_node": "<specialist>"}.
If unsure, route to "concierge"."#;

/// Selects exactly one specialist per fresh turn. Routing can never fail a
/// run: anything the capability returns that is not one of the four valid
/// tags - including a transport error - collapses to `Concierge`.
pub struct Router {
    llm: Arc<dyn LlmClient>,
}

impl Router {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn route(&self, messages: &[Message]) -> RouteDecision {
        let mut prompt_log = Vec::with_capacity(messages.len() + 1);
        prompt_log.push(Message::user(ROUTER_INSTRUCTIONS));
        prompt_log.extend_from_slice(messages);

        match self.llm.complete(&prompt_log).await {
            Ok(raw) => parse_route_decision(&raw).unwrap_or_else(|| {
                tracing::debug!(
                    event_name = "agent.router.unparsable_decision",
                    raw = %raw,
                    "routing output did not name a specialist, defaulting to concierge"
                );
                RouteDecision { next_node: Specialist::Concierge }
            }),
            Err(error) => {
                tracing::warn!(
                    event_name = "agent.router.capability_failed",
                    error = %error,
                    "routing capability failed, defaulting to concierge"
                );
                RouteDecision { next_node: Specialist::Concierge }
            }
        }
    }
}

fn parse_route_decision(raw: &str) -> Option<RouteDecision> {
    let trimmed = raw.trim();

    if let Some(specialist) = routable_from_tag(trimmed) {
        return Some(RouteDecision { next_node: specialist });
    }

    extract_json_object(trimmed)
        .and_then(|object| {
            object.get("next_node").and_then(Value::as_str).and_then(routable_from_tag)
        })
        .map(|next_node| RouteDecision { next_node })
}

/// Only the four routable tags are valid here; `retention` is intentionally
/// absent, it is never a routing target.
fn routable_from_tag(tag: &str) -> Option<Specialist> {
    match tag.trim().trim_matches('"').to_ascii_lowercase().as_str() {
        "concierge" => Some(Specialist::Concierge),
        "support" => Some(Specialist::Support),
        "researcher" => Some(Specialist::Researcher),
        "transactional" => Some(Specialist::Transactional),
        _ => None,
    }
}

/// Best-effort recovery of a JSON object from free text: a direct parse, then
/// the span between the outermost braces (which also covers fenced output).
fn extract_json_object(raw: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return value.is_object().then_some(value);
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&raw[start..=end]).ok().filter(Value::is_object)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use outfitter_core::{Message, Specialist};

    use super::{parse_route_decision, Router};
    use crate::llm::{LlmClient, LlmError, LlmReply, ToolSchema};

    struct FixedLlm {
        reply: Result<String, LlmError>,
    }

    #[async_trait]
    impl LlmClient for FixedLlm {
        async fn complete(&self, _messages: &[Message]) -> Result<String, LlmError> {
            self.reply.clone()
        }

        async fn complete_with_tools(
            &self,
            _messages: &[Message],
            _tools: &[ToolSchema],
        ) -> Result<LlmReply, LlmError> {
            self.reply.clone().map(LlmReply::Text)
        }
    }

    async fn route_with(reply: Result<String, LlmError>) -> Specialist {
        let router = Router::new(Arc::new(FixedLlm { reply }));
        router.route(&[Message::user("hello")]).await.next_node
    }

    #[tokio::test]
    async fn structured_decision_routes_directly() {
        let next = route_with(Ok(r#"{"next_node": "transactional"}"#.to_string())).await;
        assert_eq!(next, Specialist::Transactional);
    }

    #[tokio::test]
    async fn bare_tag_is_accepted() {
        assert_eq!(route_with(Ok("researcher".to_string())).await, Specialist::Researcher);
        assert_eq!(route_with(Ok("\"support\"".to_string())).await, Specialist::Support);
    }

    #[tokio::test]
    async fn json_is_recovered_from_surrounding_prose() {
        let next = route_with(Ok(
            "Sure! Based on the intent I pick:\n```json\n{\"next_node\": \"support\"}\n```\nDone."
                .to_string(),
        ))
        .await;
        assert_eq!(next, Specialist::Support);
    }

    #[tokio::test]
    async fn garbage_output_defaults_to_concierge() {
        assert_eq!(route_with(Ok("42 bananas".to_string())).await, Specialist::Concierge);
        assert_eq!(route_with(Ok(String::new())).await, Specialist::Concierge);
        assert_eq!(
            route_with(Ok(r#"{"next_node": "retention"}"#.to_string())).await,
            Specialist::Concierge,
            "retention is not a routing target"
        );
    }

    #[tokio::test]
    async fn capability_failure_defaults_to_concierge() {
        let next = route_with(Err(LlmError::Transport("connection reset".to_string()))).await;
        assert_eq!(next, Specialist::Concierge);
    }

    #[test]
    fn parser_ignores_non_object_json() {
        assert!(parse_route_decision("[1, 2, 3]").is_none());
        assert!(parse_route_decision("{\"other\": \"concierge\"}").is_none());
    }
}
