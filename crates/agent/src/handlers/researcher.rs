use std::sync::Arc;

use serde_json::json;

use outfitter_core::{AgentResponse, Message, MessageRole, Product};
use outfitter_db::CatalogService;

use crate::llm::LlmClient;
use crate::market::MarketDataClient;

/// At most this many internal matches reach the synthesis prompt.
const MAX_INTERNAL_MATCHES: usize = 5;
/// Each serialized description is cut to this many characters.
const DESCRIPTION_LIMIT: usize = 200;
/// The plain-text fallback quotes this much of the external data.
const FALLBACK_EXCERPT_LIMIT: usize = 400;

/// Comparison specialist: pairs internal catalog matches with externally
/// sourced market data and synthesizes a product carousel. Every failure
/// path ends in a valid response.
pub struct ResearcherHandler {
    llm: Arc<dyn LlmClient>,
    catalog: Arc<dyn CatalogService>,
    market: Arc<dyn MarketDataClient>,
}

impl ResearcherHandler {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        catalog: Arc<dyn CatalogService>,
        market: Arc<dyn MarketDataClient>,
    ) -> Self {
        Self { llm, catalog, market }
    }

    pub async fn run(&self, log: &[Message]) -> AgentResponse {
        let query = log
            .iter()
            .rev()
            .find(|message| message.role == MessageRole::User)
            .map(|message| message.content.clone())
            .unwrap_or_default();

        let keywords = self.extract_keywords(&query).await;

        let internal = self.catalog.search(&keywords, None).await;
        let internal_json = serialize_internal(&internal);

        let external = match self
            .market
            .search(&format!("best {keywords} 2026 price comparison reviews"))
            .await
        {
            Ok(data) => data,
            Err(error) => {
                tracing::warn!(
                    event_name = "agent.researcher.market_failed",
                    error = %error,
                    "market search failed, synthesizing from internal data only"
                );
                String::new()
            }
        };

        let prompt = synthesis_prompt(&query, &internal_json, &external);
        match self.llm.complete(&[Message::user(prompt)]).await {
            Ok(raw) => parse_carousel(&raw)
                .unwrap_or_else(|| fallback_response(&query, internal.len(), &external)),
            Err(error) => {
                tracing::warn!(
                    event_name = "agent.researcher.synthesis_failed",
                    error = %error,
                    "synthesis capability failed, falling back to text"
                );
                fallback_response(&query, internal.len(), &external)
            }
        }
    }

    /// Compact search keywords from the shopper's question; the raw question
    /// stands in when the capability is unavailable.
    async fn extract_keywords(&self, query: &str) -> String {
        let prompt = format!(
            "From the shopper query: '{query}', extract 1-3 key product types or names to \
             search.\nExamples: \"boots\", \"jacket parka\", \"trailblazer\"\nOutput ONLY the \
             keywords, no explanation."
        );

        match self.llm.complete(&[Message::user(prompt)]).await {
            Ok(keywords) if !keywords.trim().is_empty() => keywords.trim().to_string(),
            _ => query.to_string(),
        }
    }
}

/// Serialize internal matches for the synthesis prompt: top 5, descriptions
/// truncated, identity fields verbatim so the model can only copy them.
fn serialize_internal(products: &[Product]) -> String {
    let trimmed: Vec<serde_json::Value> = products
        .iter()
        .take(MAX_INTERNAL_MATCHES)
        .map(|product| {
            json!({
                "id": product.id.0,
                "name": product.name,
                "slug": product.slug,
                "price": product.price,
                "description": truncate(&product.description, DESCRIPTION_LIMIT),
                "features": product.features.iter().take(4).collect::<Vec<_>>(),
                "rating": product.rating,
            })
        })
        .collect();

    serde_json::to_string_pretty(&trimmed).unwrap_or_else(|_| "[]".to_string())
}

fn synthesis_prompt(query: &str, internal_json: &str, external: &str) -> String {
    format!(
        r#"You are a product comparison analyst.

SHOPPER QUERY: {query}

=== OUR INTERNAL INVENTORY (USE EXACTLY AS PROVIDED) ===
{internal_json}

=== EXTERNAL MARKET DATA ===
{external}

STRICT RULES:
1. For OUR products: use ONLY the exact id, name, slug, and price from the inventory above. DO NOT make up products.
2. If no internal products match, say "No matching internal product" but still show competitors.
3. Extract 2-3 competitor products from the external data with real prices.

OUTPUT FORMAT (valid JSON only):
{{
    "type": "product_carousel",
    "content": "Brief comparison summary (2-3 sentences)",
    "data": [
        {{
            "id": "competitor_1",
            "name": "Competitor Name",
            "price": 123.99,
            "description": "Key differentiator",
            "url": "source_url_if_available"
        }},
        {{
            "id": "EXACT_ID_FROM_INVENTORY",
            "name": "EXACT_NAME_FROM_INVENTORY",
            "price": 129.99,
            "description": "Our advantage",
            "slug": "EXACT_SLUG_FROM_INVENTORY"
        }}
    ]
}}"#
    )
}

/// Accept the synthesis output only if it parses as a carousel; fenced JSON
/// is unwrapped first.
fn parse_carousel(raw: &str) -> Option<AgentResponse> {
    let candidate = strip_code_fences(raw);
    let response: AgentResponse = serde_json::from_str(candidate).ok()?;
    matches!(response, AgentResponse::ProductCarousel { .. }).then_some(response)
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    for fence in ["```json", "```"] {
        if let Some(rest) = trimmed.strip_prefix(fence) {
            if let Some(end) = rest.find("```") {
                return rest[..end].trim();
            }
        }
    }
    trimmed
}

fn fallback_response(query: &str, internal_count: usize, external: &str) -> AgentResponse {
    AgentResponse::text(format!(
        "Research on '{query}': found {internal_count} matching products in our catalog. \
         Market data: {}...",
        truncate(external, FALLBACK_EXCERPT_LIMIT)
    ))
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
