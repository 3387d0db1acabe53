use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::gateway::{CartItem, CheckoutSession, GatewayError, PaymentIntent, SessionStatus};

use super::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentRequest {
    /// Amount in cents.
    pub amount: i64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Serialize)]
pub struct GatewayConfigReply {
    pub publishable_key: String,
}

fn default_currency() -> String {
    "usd".to_string()
}

pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSession>, ApiError> {
    state
        .gateway
        .create_checkout_session(&request.items, &request.success_url, &request.cancel_url)
        .await
        .map(Json)
        .map_err(gateway_error)
}

pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntent>, ApiError> {
    state
        .gateway
        .create_payment_intent(request.amount, &request.currency)
        .await
        .map(Json)
        .map_err(gateway_error)
}

/// Publishable key for client-side gateway initialization; 500 when the
/// deployment has no key configured.
pub async fn gateway_config(
    State(state): State<AppState>,
) -> Result<Json<GatewayConfigReply>, ApiError> {
    state
        .gateway
        .publishable_key()
        .map(|publishable_key| Json(GatewayConfigReply { publishable_key }))
        .ok_or_else(|| ApiError::internal("Gateway publishable key not configured"))
}

pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatus>, ApiError> {
    state.gateway.session_status(&session_id).await.map(Json).map_err(gateway_error)
}

fn gateway_error(error: GatewayError) -> ApiError {
    match error {
        GatewayError::NotConfigured(message) => ApiError::internal(message),
        GatewayError::Rejected(message) => ApiError::bad_request(message),
    }
}
