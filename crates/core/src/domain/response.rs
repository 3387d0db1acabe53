use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::mandate::PaymentMandate;

/// One entry of a comparison/recommendation carousel. Internal entries carry
/// the catalog slug; competitor entries carry a source url instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarouselItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferDetails {
    pub discount: String,
    pub code: String,
    pub expiry: String,
}

/// Terminal result of a run, shaped for the storefront UI: the `type` tag
/// selects the component that renders it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentResponse {
    Text { content: String },
    ProductCarousel { content: String, data: Vec<CarouselItem> },
    Ap2Receipt { content: String, data: PaymentMandate },
    OfferCard { content: String, offer_details: OfferDetails },
}

impl AgentResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text { content: content.into() }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Text { content }
            | Self::ProductCarousel { content, .. }
            | Self::Ap2Receipt { content, .. }
            | Self::OfferCard { content, .. } => content,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{AgentResponse, CarouselItem, OfferDetails};

    #[test]
    fn responses_tag_with_snake_case_type() {
        let carousel = AgentResponse::ProductCarousel {
            content: "Two solid options".to_string(),
            data: vec![CarouselItem {
                id: "prod-boots-001".to_string(),
                name: "TrailBlazer Hiking Boots".to_string(),
                price: Decimal::new(12_999, 2),
                description: "Our waterproof flagship".to_string(),
                url: None,
                slug: Some("trailblazer-hiking-boots".to_string()),
            }],
        };
        let encoded = serde_json::to_value(&carousel).expect("encode");
        assert_eq!(encoded["type"], "product_carousel");
        assert!(encoded["data"][0].get("url").is_none());

        let offer = AgentResponse::OfferCard {
            content: "Still thinking it over?".to_string(),
            offer_details: OfferDetails {
                discount: "10%".to_string(),
                code: "HIKE2026".to_string(),
                expiry: "1 hour".to_string(),
            },
        };
        assert_eq!(serde_json::to_value(&offer).expect("encode")["type"], "offer_card");
    }

    #[test]
    fn carousel_parses_from_model_emitted_json() {
        let decoded: AgentResponse = serde_json::from_str(
            r#"{
                "type": "product_carousel",
                "content": "Comparison summary",
                "data": [
                    {"id": "competitor_1", "name": "Peak Pro", "price": 149.0,
                     "description": "Lighter but not waterproof", "url": "https://example.com"}
                ]
            }"#,
        )
        .expect("decode");

        let AgentResponse::ProductCarousel { data, .. } = decoded else {
            panic!("expected carousel");
        };
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn content_accessor_reaches_every_variant() {
        assert_eq!(AgentResponse::text("plain").content(), "plain");
    }
}
