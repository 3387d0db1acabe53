use uuid::Uuid;

use outfitter_core::{
    AgentResponse, DomainError, Message, PaymentMandate, Product, Specialist, SuspensionKind,
    SuspensionRequest,
};

use crate::intent::PurchaseIntentExtractor;

/// Tokens whose presence (case-insensitive) in the resume decision captures
/// the mandate; everything else cancels it.
const AFFIRMATIVE_TOKENS: [&str; 2] = ["yes", "confirm"];

/// The purchase specialist, written as the explicit two-phase state machine:
/// `propose` builds the mandate and halts the run behind a confirmation
/// request; `resolve` finishes it with the shopper's decision. The mandate
/// travels inside the persisted suspension between the two phases -
/// `resolve` never rebuilds it, so a purchase can only be proposed once.
#[derive(Clone, Debug, Default)]
pub struct TransactionalHandler {
    extractor: PurchaseIntentExtractor,
}

impl TransactionalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step A: infer the purchase, create a `proposed` mandate, and raise the
    /// confirmation suspension.
    pub fn propose(
        &self,
        log: &[Message],
        products: &[Product],
        buyer_id: &str,
    ) -> SuspensionRequest {
        let intent = self.extractor.extract(log, products);
        let mandate = PaymentMandate::proposed(buyer_id, intent.currency, intent.items);

        let query = format!(
            "I have prepared a secure transaction for {} {}. Do you authorize this payment?",
            mandate.total_amount, mandate.currency
        );

        SuspensionRequest {
            kind: SuspensionKind::ConfirmationRequest,
            raised_by: Specialist::Transactional,
            mandate,
            query,
        }
    }

    /// Step B: interpret the injected human decision and finalize the carried
    /// mandate.
    pub fn resolve(
        &self,
        mut mandate: PaymentMandate,
        decision: &str,
    ) -> Result<(PaymentMandate, AgentResponse), DomainError> {
        let normalized = decision.to_lowercase();
        let affirmative = AFFIRMATIVE_TOKENS.iter().any(|token| normalized.contains(token));

        if affirmative {
            mandate.capture(generate_auth_token())?;
            let response = AgentResponse::Ap2Receipt {
                content: "Transaction successful! Securely processed via Agent Payments Protocol."
                    .to_string(),
                data: mandate.clone(),
            };
            Ok((mandate, response))
        } else {
            mandate.fail()?;
            let response = AgentResponse::text("Transaction cancelled. No charges were made.");
            Ok((mandate, response))
        }
    }
}

fn generate_auth_token() -> String {
    format!("auth_{}", &Uuid::new_v4().simple().to_string()[..12])
}
