use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::ProductId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MandateId(pub String);

impl MandateId {
    pub fn generate() -> Self {
        Self(format!("mandate_{}", &Uuid::new_v4().simple().to_string()[..8]))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandateStatus {
    Proposed,
    Authorized,
    Captured,
    Failed,
}

impl MandateStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Captured | Self::Failed)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MandateLineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// A structured intent to purchase: created `proposed` before the human
/// confirmation pause, resolved to exactly one of `captured` or `failed`
/// afterwards, and frozen from then on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentMandate {
    pub mandate_id: MandateId,
    pub created_at: DateTime<Utc>,
    status: MandateStatus,
    pub buyer_id: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub items: Vec<MandateLineItem>,
    auth_token: Option<String>,
    pub risk_score: f32,
}

impl PaymentMandate {
    pub fn proposed(
        buyer_id: impl Into<String>,
        currency: impl Into<String>,
        items: Vec<MandateLineItem>,
    ) -> Self {
        let total_amount = items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum::<Decimal>();

        Self {
            mandate_id: MandateId::generate(),
            created_at: Utc::now(),
            status: MandateStatus::Proposed,
            buyer_id: buyer_id.into(),
            total_amount,
            currency: currency.into(),
            items,
            auth_token: None,
            risk_score: 0.0,
        }
    }

    pub fn status(&self) -> MandateStatus {
        self.status
    }

    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Finalize the mandate after an affirmative human decision. The opaque
    /// token stands in for the signed authorization a real rail would return.
    pub fn capture(&mut self, auth_token: impl Into<String>) -> Result<(), DomainError> {
        self.transition(MandateStatus::Captured)?;
        self.auth_token = Some(auth_token.into());
        Ok(())
    }

    /// Finalize the mandate after a declined or unrecognized decision.
    pub fn fail(&mut self) -> Result<(), DomainError> {
        self.transition(MandateStatus::Failed)
    }

    fn transition(&mut self, to: MandateStatus) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::InvalidMandateTransition { from: self.status, to });
        }
        self.status = to;
        Ok(())
    }
}
