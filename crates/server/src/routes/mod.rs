//! JSON API surface under `/api/v1`.
//!
//! - `POST /api/v1/chat/message`  — run one agent turn (final response or
//!   confirmation payload)
//! - `POST /api/v1/chat/clear`    — reset a session
//! - `GET  /api/v1/products`      — list/search products
//! - `GET  /api/v1/products/{id}` / `GET /api/v1/products/slug/{slug}`
//! - `GET  /api/v1/categories`
//! - `GET  /api/v1/orders?user_id=`
//! - `POST /api/v1/checkout/create-checkout-session`
//! - `POST /api/v1/checkout/create-payment-intent`
//! - `GET  /api/v1/checkout/config` / `GET /api/v1/checkout/session/{id}`

pub mod categories;
pub mod chat;
pub mod checkout;
pub mod orders;
pub mod products;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use outfitter_agent::AgentRuntime;
use outfitter_core::InterfaceError;
use outfitter_db::{CatalogService, OrderService};

use crate::gateway::PaymentGateway;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<AgentRuntime>,
    pub catalog: Arc<dyn CatalogService>,
    pub orders: Arc<dyn OrderService>,
    pub gateway: Arc<dyn PaymentGateway>,
}

pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/chat/message", post(chat::chat_message))
        .route("/api/v1/chat/clear", post(chat::clear_session))
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products/slug/{slug}", get(products::get_product_by_slug))
        .route("/api/v1/products/{product_id}", get(products::get_product))
        .route("/api/v1/categories", get(categories::list_categories))
        .route("/api/v1/orders", get(orders::list_orders))
        .route("/api/v1/checkout/create-checkout-session", post(checkout::create_checkout_session))
        .route("/api/v1/checkout/create-payment-intent", post(checkout::create_payment_intent))
        .route("/api/v1/checkout/config", get(checkout::gateway_config))
        .route("/api/v1/checkout/session/{session_id}", get(checkout::session_status))
        .with_state(state)
}

/// Error body every endpoint renders; internal failures never reach the
/// caller raw.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: ErrorBody { error: message.into(), correlation_id: None },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody { error: message.into(), correlation_id: None },
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody { error: message.into(), correlation_id: None },
        }
    }
}

impl From<InterfaceError> for ApiError {
    fn from(error: InterfaceError) -> Self {
        let status = match &error {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            body: ErrorBody {
                error: error.user_message().to_string(),
                correlation_id: Some(error.correlation_id().to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use outfitter_agent::llm::{LlmClient, LlmError, LlmReply, ToolSchema};
    use outfitter_agent::market::{MarketDataClient, MarketError};
    use outfitter_agent::AgentRuntime;
    use outfitter_core::Message;
    use outfitter_db::{InMemoryCheckpointStore, StaticCatalog};

    use super::{api_router, AppState};
    use crate::gateway::SimulatedPaymentGateway;

    struct EchoLlm;

    #[async_trait]
    impl LlmClient for EchoLlm {
        async fn complete(&self, _messages: &[Message]) -> Result<String, LlmError> {
            Ok("concierge".to_string())
        }

        async fn complete_with_tools(
            &self,
            _messages: &[Message],
            _tools: &[ToolSchema],
        ) -> Result<LlmReply, LlmError> {
            Ok(LlmReply::Text("Happy to help you browse our gear.".to_string()))
        }
    }

    struct EmptyMarket;

    #[async_trait]
    impl MarketDataClient for EmptyMarket {
        async fn search(&self, _query: &str) -> Result<String, MarketError> {
            Ok(String::new())
        }
    }

    fn state() -> AppState {
        let catalog = Arc::new(StaticCatalog::from_seed());
        let runtime = AgentRuntime::new(
            Arc::new(EchoLlm),
            Arc::new(InMemoryCheckpointStore::default()),
            catalog.clone(),
            catalog.clone(),
            Arc::new(EmptyMarket),
        );
        AppState {
            runtime: Arc::new(runtime),
            catalog: catalog.clone(),
            orders: catalog,
            gateway: Arc::new(SimulatedPaymentGateway::new(None)),
        }
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    #[tokio::test]
    async fn chat_message_route_returns_an_enveloped_final_response() {
        let response = api_router(state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/chat/message")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"message": "I need hiking boots"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_string(response).await;
        assert!(body.contains("session_id"));
        assert!(body.contains("\"type\":\"text\""));
    }

    #[tokio::test]
    async fn product_routes_serve_the_catalog() {
        let listing = api_router(state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/products?search=boots")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(listing.status(), StatusCode::OK);
        assert!(body_string(listing).await.contains("TrailBlazer"));

        let missing = api_router(state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/products/prod-missing")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert!(body_string(missing).await.contains("Product not found"));
    }

    #[tokio::test]
    async fn categories_and_orders_routes_respond() {
        let categories = api_router(state())
            .oneshot(Request::builder().uri("/api/v1/categories").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(categories.status(), StatusCode::OK);
        assert!(body_string(categories).await.contains("footwear"));

        let orders = api_router(state())
            .oneshot(
                Request::builder()
                    .uri("/api/v1/orders?user_id=user_123")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(orders.status(), StatusCode::OK);
        assert!(body_string(orders).await.contains("ord-1001"));
    }
}
