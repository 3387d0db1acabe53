use std::sync::Arc;

use outfitter_core::{AgentResponse, Message};
use outfitter_db::{CatalogService, OrderService};

use crate::handlers::tool_loop::ToolLoopHandler;
use crate::llm::LlmClient;
use crate::tools::{concierge_toolset, ToolExecutor};

const CONCIERGE_PROMPT: &str = "You are the concierge for a premium outdoor gear storefront. \
Help the shopper discover products: recommend, compare at a high level, and answer questions \
about what we stock. Always look up real catalog data with your tools before answering; never \
invent products or prices. Keep replies short and concrete.";

/// Product-discovery specialist: the shared tool loop bound to the catalog
/// toolset.
pub struct ConciergeHandler {
    inner: ToolLoopHandler,
}

impl ConciergeHandler {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        catalog: Arc<dyn CatalogService>,
        orders: Arc<dyn OrderService>,
    ) -> Self {
        Self {
            inner: ToolLoopHandler::new(
                llm,
                ToolExecutor::new(catalog, orders),
                CONCIERGE_PROMPT.to_string(),
                concierge_toolset(),
            ),
        }
    }

    pub async fn run(&self, log: &[Message]) -> (Vec<Message>, AgentResponse) {
        self.inner.run(log).await
    }
}
