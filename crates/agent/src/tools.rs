use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use outfitter_core::{Message, ProductId, UserId};
use outfitter_db::{CatalogService, OrderService};

use crate::llm::{ToolCallRequest, ToolSchema};

/// The fixed tool vocabulary, decoded into a closed enum before anything
/// executes. An unrecognized name is data, not a failure: it becomes an
/// explicit in-band result the capability can react to.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolInvocation {
    SearchProducts { query: String, category: Option<String> },
    GetProductDetails { product_id: String },
    ListCategories,
    CheckOrderStatus { user_id: String },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ToolParseError {
    #[error("tool not found: `{0}` is not part of this toolset")]
    UnknownTool(String),
    #[error("invalid arguments for `{tool}`: {reason}")]
    InvalidArguments { tool: String, reason: String },
}

#[derive(Debug, Deserialize)]
struct SearchProductsArgs {
    #[serde(default)]
    query: String,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetProductDetailsArgs {
    product_id: String,
}

#[derive(Debug, Deserialize)]
struct CheckOrderStatusArgs {
    user_id: String,
}

impl ToolInvocation {
    pub fn parse(name: &str, arguments: &Value) -> Result<Self, ToolParseError> {
        match name {
            "search_products" => {
                let args: SearchProductsArgs = decode(name, arguments)?;
                Ok(Self::SearchProducts { query: args.query, category: args.category })
            }
            "get_product_details" => {
                let args: GetProductDetailsArgs = decode(name, arguments)?;
                Ok(Self::GetProductDetails { product_id: args.product_id })
            }
            "list_categories" => Ok(Self::ListCategories),
            "check_order_status" => {
                let args: CheckOrderStatusArgs = decode(name, arguments)?;
                Ok(Self::CheckOrderStatus { user_id: args.user_id })
            }
            other => Err(ToolParseError::UnknownTool(other.to_string())),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(name: &str, arguments: &Value) -> Result<T, ToolParseError> {
    serde_json::from_value(arguments.clone()).map_err(|error| ToolParseError::InvalidArguments {
        tool: name.to_string(),
        reason: error.to_string(),
    })
}

/// Executes decoded tool calls against the injected lookup capabilities.
/// Every path - including unknown tools and decode failures - produces a
/// tool-result [`Message`]; execution never fails the run.
pub struct ToolExecutor {
    catalog: Arc<dyn CatalogService>,
    orders: Arc<dyn OrderService>,
}

impl ToolExecutor {
    pub fn new(catalog: Arc<dyn CatalogService>, orders: Arc<dyn OrderService>) -> Self {
        Self { catalog, orders }
    }

    pub async fn execute(&self, call: &ToolCallRequest) -> Message {
        let payload = json!({ "tool": call.name, "call_id": call.id });

        let content = match ToolInvocation::parse(&call.name, &call.arguments) {
            Ok(invocation) => self.run(invocation).await,
            Err(error) => format!("Error: {error}"),
        };

        Message::tool_result(content, payload)
    }

    async fn run(&self, invocation: ToolInvocation) -> String {
        match invocation {
            ToolInvocation::SearchProducts { query, category } => {
                let products = self.catalog.search(&query, category.as_deref()).await;
                encode(&products)
            }
            ToolInvocation::GetProductDetails { product_id } => {
                match self.catalog.get_by_id(&ProductId(product_id.clone())).await {
                    Some(product) => encode(&product),
                    None => format!("Error: no product with id `{product_id}`"),
                }
            }
            ToolInvocation::ListCategories => {
                let slugs: Vec<String> = self
                    .catalog
                    .list_categories()
                    .await
                    .into_iter()
                    .map(|category| category.slug)
                    .collect();
                encode(&slugs)
            }
            ToolInvocation::CheckOrderStatus { user_id } => {
                let orders = self.orders.orders_for_user(&UserId(user_id)).await;
                encode(&orders)
            }
        }
    }
}

fn encode<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|error| format!("Error: {error}"))
}

pub fn concierge_toolset() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "search_products".to_string(),
            description: "Search the catalog by free-text query, optionally scoped to a \
                          category slug. Use this whenever the shopper asks for a kind of gear."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Free-text search terms" },
                    "category": { "type": "string", "description": "Optional category slug" }
                },
                "required": ["query"]
            }),
        },
        ToolSchema {
            name: "get_product_details".to_string(),
            description: "Fetch full details for one product by its id.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "product_id": { "type": "string" }
                },
                "required": ["product_id"]
            }),
        },
        ToolSchema {
            name: "list_categories".to_string(),
            description: "List every product category slug.".to_string(),
            parameters: json!({ "type": "object", "properties": {} }),
        },
    ]
}

pub fn support_toolset() -> Vec<ToolSchema> {
    vec![ToolSchema {
        name: "check_order_status".to_string(),
        description: "Look up the orders for a customer id. Use for 'where is my \
                      order?' style questions."
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "user_id": { "type": "string" }
            },
            "required": ["user_id"]
        }),
    }]
}
