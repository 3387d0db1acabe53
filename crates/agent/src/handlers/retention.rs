use outfitter_core::{AgentResponse, OfferDetails};

/// Stateless offer specialist: always the same discount card. Not a routing
/// target today; dispatched only when a future rule decides a shopper is
/// hesitating.
#[derive(Clone, Debug, Default)]
pub struct RetentionHandler;

impl RetentionHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn run(&self) -> AgentResponse {
        AgentResponse::OfferCard {
            content: "I noticed you're looking at the Hiking Boots again!".to_string(),
            offer_details: OfferDetails {
                discount: "10%".to_string(),
                code: "HIKE2026".to_string(),
                expiry: "1 hour".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use outfitter_core::AgentResponse;

    use super::RetentionHandler;

    #[test]
    fn offer_card_is_fixed() {
        let first = RetentionHandler::new().run();
        let second = RetentionHandler::new().run();
        assert_eq!(first, second);

        let AgentResponse::OfferCard { offer_details, .. } = first else {
            panic!("expected offer card");
        };
        assert_eq!(offer_details.code, "HIKE2026");
    }
}
