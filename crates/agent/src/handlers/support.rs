use std::sync::Arc;

use outfitter_core::{AgentResponse, Message};
use outfitter_db::{CatalogService, OrderService};

use crate::handlers::tool_loop::ToolLoopHandler;
use crate::llm::LlmClient;
use crate::tools::{support_toolset, ToolExecutor};

/// Post-purchase specialist: order status, returns, shipping questions.
pub struct SupportHandler {
    inner: ToolLoopHandler,
}

impl SupportHandler {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        catalog: Arc<dyn CatalogService>,
        orders: Arc<dyn OrderService>,
        customer_id: &str,
    ) -> Self {
        let prompt = format!(
            "You are the support specialist for an outdoor gear storefront. Handle order \
             status, returns, and shipping questions. The signed-in customer id is \
             `{customer_id}`; use it when checking orders. Look up real order data with your \
             tools before answering."
        );

        Self {
            inner: ToolLoopHandler::new(
                llm,
                ToolExecutor::new(catalog, orders),
                prompt,
                support_toolset(),
            ),
        }
    }

    pub async fn run(&self, log: &[Message]) -> (Vec<Message>, AgentResponse) {
        self.inner.run(log).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use outfitter_core::Message;
    use outfitter_db::StaticCatalog;
    use serde_json::json;

    use super::SupportHandler;
    use crate::llm::{LlmClient, LlmError, LlmReply, ToolCallRequest, ToolSchema};

    struct OrderStatusLlm {
        second_pass: Mutex<bool>,
    }

    #[async_trait]
    impl LlmClient for OrderStatusLlm {
        async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
            *self.second_pass.lock().expect("lock") = true;
            let has_order_data =
                messages.iter().any(|message| message.content.contains("ord-1001"));
            Ok(if has_order_data {
                "Your boots shipped - tracking 1Z999AA10123456784.".to_string()
            } else {
                "I could not find any orders.".to_string()
            })
        }

        async fn complete_with_tools(
            &self,
            _messages: &[Message],
            tools: &[ToolSchema],
        ) -> Result<LlmReply, LlmError> {
            assert_eq!(tools.len(), 1, "support binds exactly one tool");
            Ok(LlmReply::ToolCalls(vec![ToolCallRequest {
                id: "call_1".to_string(),
                name: "check_order_status".to_string(),
                arguments: json!({"user_id": "user_123"}),
            }]))
        }
    }

    #[tokio::test]
    async fn support_answers_from_real_order_data() {
        let catalog = Arc::new(StaticCatalog::from_seed());
        let llm = Arc::new(OrderStatusLlm { second_pass: Mutex::new(false) });
        let handler = SupportHandler::new(llm.clone(), catalog.clone(), catalog, "user_123");

        let (transcript, response) =
            handler.run(&[Message::user("where is my order?")]).await;

        assert!(*llm.second_pass.lock().expect("lock"));
        assert!(transcript.iter().any(|m| m.content.contains("ord-1001")));
        assert!(response.content().contains("tracking"));
    }
}
