use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GatewayError {
    #[error("payment gateway is not configured: {0}")]
    NotConfigured(String),
    #[error("payment gateway rejected the request: {0}")]
    Rejected(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CheckoutSession {
    pub session_id: String,
    pub checkout_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PaymentIntent {
    pub client_secret: String,
    pub payment_intent_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionStatus {
    pub status: String,
    pub payment_status: String,
    pub amount_total: Decimal,
}

/// The payment-rail boundary the checkout endpoints talk to. Only the
/// simulated implementation ships: this system proposes and records payment
/// intent, it never moves money.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(
        &self,
        items: &[CartItem],
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, GatewayError>;

    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentIntent, GatewayError>;

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError>;

    fn publishable_key(&self) -> Option<String>;
}

/// Test-mode gateway: issues deterministic-looking ids, remembers the
/// sessions it created, and never touches the network.
pub struct SimulatedPaymentGateway {
    publishable_key: Option<String>,
    sessions: RwLock<HashMap<String, SessionStatus>>,
}

impl SimulatedPaymentGateway {
    pub fn new(publishable_key: Option<String>) -> Self {
        Self { publishable_key, sessions: RwLock::new(HashMap::new()) }
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPaymentGateway {
    async fn create_checkout_session(
        &self,
        items: &[CartItem],
        _success_url: &str,
        _cancel_url: &str,
    ) -> Result<CheckoutSession, GatewayError> {
        if items.is_empty() {
            return Err(GatewayError::Rejected("cart is empty".to_string()));
        }
        if let Some(bad) = items.iter().find(|item| item.quantity == 0) {
            return Err(GatewayError::Rejected(format!(
                "line item `{}` has zero quantity",
                bad.id
            )));
        }

        let amount_total = items
            .iter()
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum::<Decimal>();

        let session_id = format!("cs_test_{}", &Uuid::new_v4().simple().to_string()[..16]);
        let checkout_url = format!("https://checkout.outfitter.test/pay/{session_id}");

        self.sessions.write().await.insert(
            session_id.clone(),
            SessionStatus {
                status: "open".to_string(),
                payment_status: "unpaid".to_string(),
                amount_total,
            },
        );

        Ok(CheckoutSession { session_id, checkout_url })
    }

    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> Result<PaymentIntent, GatewayError> {
        if amount_cents <= 0 {
            return Err(GatewayError::Rejected(format!(
                "amount must be positive, got {amount_cents}"
            )));
        }
        if currency.trim().is_empty() {
            return Err(GatewayError::Rejected("currency must not be empty".to_string()));
        }

        let payment_intent_id = format!("pi_test_{}", &Uuid::new_v4().simple().to_string()[..16]);
        let client_secret =
            format!("{payment_intent_id}_secret_{}", &Uuid::new_v4().simple().to_string()[..8]);

        Ok(PaymentIntent { client_secret, payment_intent_id })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected(format!("no such session `{session_id}`")))
    }

    fn publishable_key(&self) -> Option<String> {
        self.publishable_key.clone()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{CartItem, GatewayError, PaymentGateway, SimulatedPaymentGateway};

    fn boots_item() -> CartItem {
        CartItem {
            id: "prod-boots-001".to_string(),
            name: "TrailBlazer Hiking Boots".to_string(),
            price: Decimal::new(12_999, 2),
            quantity: 2,
            image: None,
        }
    }

    #[tokio::test]
    async fn checkout_session_totals_the_cart_and_is_queryable() {
        let gateway = SimulatedPaymentGateway::new(None);

        let session = gateway
            .create_checkout_session(&[boots_item()], "https://ok", "https://cancel")
            .await
            .expect("session");
        assert!(session.session_id.starts_with("cs_test_"));
        assert!(session.checkout_url.contains(&session.session_id));

        let status = gateway.session_status(&session.session_id).await.expect("status");
        assert_eq!(status.status, "open");
        assert_eq!(status.amount_total, Decimal::new(25_998, 2));
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let gateway = SimulatedPaymentGateway::new(None);
        let error = gateway
            .create_checkout_session(&[], "https://ok", "https://cancel")
            .await
            .expect_err("must reject");
        assert_eq!(error, GatewayError::Rejected("cart is empty".to_string()));
    }

    #[tokio::test]
    async fn payment_intents_require_a_positive_amount() {
        let gateway = SimulatedPaymentGateway::new(None);

        assert!(gateway.create_payment_intent(0, "usd").await.is_err());

        let intent = gateway.create_payment_intent(12_999, "usd").await.expect("intent");
        assert!(intent.payment_intent_id.starts_with("pi_test_"));
        assert!(intent.client_secret.contains("_secret_"));
    }

    #[tokio::test]
    async fn distinct_sessions_get_distinct_ids() {
        let gateway = SimulatedPaymentGateway::new(None);
        let first = gateway
            .create_checkout_session(&[boots_item()], "https://ok", "https://cancel")
            .await
            .expect("first");
        let second = gateway
            .create_checkout_session(&[boots_item()], "https://ok", "https://cancel")
            .await
            .expect("second");
        assert_ne!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn unknown_session_lookup_is_rejected() {
        let gateway = SimulatedPaymentGateway::new(None);
        assert!(gateway.session_status("cs_test_missing").await.is_err());
    }
}
