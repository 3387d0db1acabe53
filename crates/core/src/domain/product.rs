use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub String);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub category_id: CategoryId,
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews_count: u32,
}

impl Product {
    /// Case-insensitive match over the fields shoppers actually search by.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
            || self.slug.contains(&needle)
            || self.features.iter().any(|feature| feature.to_lowercase().contains(&needle))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{Category, CategoryId, Product, ProductId};

    fn boots() -> Product {
        Product {
            id: ProductId("prod-boots-001".to_string()),
            name: "TrailBlazer Hiking Boots".to_string(),
            slug: "trailblazer-hiking-boots".to_string(),
            description: "Waterproof leather boots for alpine terrain.".to_string(),
            price: Decimal::new(12_999, 2),
            currency: "USD".to_string(),
            category_id: CategoryId("cat-footwear".to_string()),
            stock: 40,
            images: vec!["/static/boots.jpg".to_string()],
            features: vec!["Vibram sole".to_string(), "Gore-Tex lining".to_string()],
            rating: 4.7,
            reviews_count: 212,
        }
    }

    #[test]
    fn matches_searches_name_description_slug_and_features() {
        let product = boots();
        assert!(product.matches("BOOTS"));
        assert!(product.matches("alpine"));
        assert!(product.matches("trailblazer-hiking"));
        assert!(product.matches("gore-tex"));
        assert!(!product.matches("kayak"));
    }

    #[test]
    fn product_defaults_apply_for_sparse_json() {
        let decoded: Product = serde_json::from_str(
            r#"{
                "id": "prod-1",
                "name": "Scout Tent",
                "slug": "scout-tent",
                "description": "Two-person tent",
                "price": 199.5,
                "category_id": "cat-camping",
                "stock": 5
            }"#,
        )
        .expect("decode");

        assert_eq!(decoded.currency, "USD");
        assert!(decoded.images.is_empty());
        assert_eq!(decoded.reviews_count, 0);
        assert_eq!(decoded.price, Decimal::new(1_995, 1));
    }

    #[test]
    fn category_round_trips() {
        let category = Category {
            id: CategoryId("cat-footwear".to_string()),
            name: "Footwear".to_string(),
            slug: "footwear".to_string(),
            description: "Boots and trail shoes".to_string(),
        };
        let encoded = serde_json::to_string(&category).expect("encode");
        let decoded: Category = serde_json::from_str(&encoded).expect("decode");
        assert_eq!(decoded, category);
    }
}
