use rust_decimal::Decimal;

use outfitter_core::{MandateLineItem, Message, MessageRole, Product};

/// What the shopper appears to be buying, inferred deterministically from the
/// conversation log. The rule mirrors how people actually talk to the agent:
/// the most recently discussed catalog product is the purchase target.
#[derive(Clone, Debug, PartialEq)]
pub struct PurchaseIntent {
    pub items: Vec<MandateLineItem>,
    pub currency: String,
}

#[derive(Clone, Debug, Default)]
pub struct PurchaseIntentExtractor;

impl PurchaseIntentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Walk the log newest-first looking for a catalog product mention;
    /// quantity comes from the latest user message. A log with no
    /// recognizable mention falls back to the catalog's first product, and an
    /// empty catalog yields a zero-priced placeholder line so the mandate
    /// flow still has something to confirm.
    pub fn extract(&self, messages: &[Message], products: &[Product]) -> PurchaseIntent {
        let quantity = messages
            .iter()
            .rev()
            .find(|message| message.role == MessageRole::User)
            .and_then(|message| extract_quantity(&tokenize(&message.content)))
            .unwrap_or(1);

        let matched = messages
            .iter()
            .rev()
            .find_map(|message| best_catalog_match(&message.content, products))
            .or_else(|| products.first());

        match matched {
            Some(product) => PurchaseIntent {
                items: vec![MandateLineItem {
                    product_id: Some(product.id.clone()),
                    name: product.name.clone(),
                    quantity,
                    unit_price: product.price,
                }],
                currency: product.currency.clone(),
            },
            None => PurchaseIntent {
                items: vec![MandateLineItem {
                    product_id: None,
                    name: "Cart item".to_string(),
                    quantity,
                    unit_price: Decimal::ZERO,
                }],
                currency: "USD".to_string(),
            },
        }
    }
}

/// Score products by how many distinctive name tokens appear in the text;
/// the best nonzero score wins, first product breaking ties.
fn best_catalog_match<'a>(text: &str, products: &'a [Product]) -> Option<&'a Product> {
    let normalized = text.to_lowercase();
    let tokens = tokenize(&normalized);

    let mut best: Option<(&Product, usize)> = None;
    for product in products {
        let score = match_score(product, &normalized, &tokens);
        if score > 0 && best.map_or(true, |(_, current)| score > current) {
            best = Some((product, score));
        }
    }
    best.map(|(product, _)| product)
}

fn match_score(product: &Product, normalized_text: &str, text_tokens: &[String]) -> usize {
    if normalized_text.contains(&product.slug) {
        return usize::MAX;
    }

    product
        .name
        .to_lowercase()
        .split_whitespace()
        .filter(|name_token| name_token.len() >= 4)
        .filter(|name_token| text_tokens.iter().any(|token| token == name_token))
        .count()
}

fn tokenize(text: &str) -> Vec<String> {
    let mut sanitized = String::with_capacity(text.len());
    for character in text.chars() {
        if character.is_ascii_alphanumeric() || character == '-' {
            sanitized.push(character.to_ascii_lowercase());
        } else {
            sanitized.push(' ');
        }
    }
    sanitized.split_whitespace().map(|token| token.to_string()).collect()
}

/// First standalone count in sensible retail range. "buy 2 tents" -> 2;
/// years and order numbers do not qualify.
fn extract_quantity(tokens: &[String]) -> Option<u32> {
    tokens
        .iter()
        .filter_map(|token| token.parse::<u32>().ok())
        .find(|quantity| (1..=99).contains(quantity))
}

#[cfg(test)]
mod tests {
    use outfitter_core::Message;
    use outfitter_db::StaticCatalog;
    use rust_decimal::Decimal;

    use super::PurchaseIntentExtractor;

    #[test]
    fn last_discussed_product_wins() {
        let catalog = StaticCatalog::from_seed();
        let log = vec![
            Message::user("I need something for a trek"),
            Message::agent("The TrailBlazer Hiking Boots are our best seller."),
            Message::user("what about the Scout two-person tent?"),
            Message::user("buy it"),
        ];

        let intent = PurchaseIntentExtractor::new().extract(&log, catalog.products());

        assert_eq!(intent.items.len(), 1);
        assert_eq!(intent.items[0].name, "Scout Two-Person Tent");
        assert_eq!(intent.items[0].quantity, 1);
    }

    #[test]
    fn quantity_is_read_from_the_latest_user_message() {
        let catalog = StaticCatalog::from_seed();
        let log = vec![
            Message::agent("The Ember 15 sleeping bag is on sale."),
            Message::user("buy 2 of those sleeping bags"),
        ];

        let intent = PurchaseIntentExtractor::new().extract(&log, catalog.products());

        assert_eq!(intent.items[0].name, "Ember 15 Sleeping Bag");
        assert_eq!(intent.items[0].quantity, 2);
    }

    #[test]
    fn slug_mentions_match_exactly() {
        let catalog = StaticCatalog::from_seed();
        let log = vec![Message::user("checkout summit-shell-jacket now")];

        let intent = PurchaseIntentExtractor::new().extract(&log, catalog.products());
        assert_eq!(intent.items[0].name, "Summit Shell Jacket");
    }

    #[test]
    fn unrecognized_intent_falls_back_to_the_first_product() {
        let catalog = StaticCatalog::from_seed();
        let log = vec![Message::user("buy it")];

        let intent = PurchaseIntentExtractor::new().extract(&log, catalog.products());
        assert_eq!(intent.items[0].name, catalog.products()[0].name);
        assert!(intent.items[0].product_id.is_some());
    }

    #[test]
    fn empty_catalog_yields_a_placeholder_line() {
        let log = vec![Message::user("buy it")];

        let intent = PurchaseIntentExtractor::new().extract(&log, &[]);
        assert_eq!(intent.items[0].name, "Cart item");
        assert_eq!(intent.items[0].unit_price, Decimal::ZERO);
        assert!(intent.items[0].product_id.is_none());
    }
}
