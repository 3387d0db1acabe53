use std::path::Path;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use outfitter_core::{
    Category, CategoryId, Order, OrderId, OrderItem, OrderStatus, Product, ProductId, User, UserId,
};

use crate::catalog::CatalogError;

/// Deterministic demo storefront: enough catalog breadth to exercise every
/// specialist (discovery, comparison, order status, purchase) without any
/// external data.
#[derive(Clone, Debug)]
pub struct SeedDataset {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub users: Vec<User>,
    pub orders: Vec<Order>,
}

impl SeedDataset {
    /// Write the dataset as the JSON data directory the server loads at
    /// startup.
    pub fn write_to_dir(&self, dir: &Path) -> Result<(), CatalogError> {
        write_json(&dir.join("products.json"), &self.products)?;
        write_json(&dir.join("categories.json"), &self.categories)?;
        write_json(&dir.join("users.json"), &self.users)?;
        write_json(&dir.join("orders.json"), &self.orders)?;
        Ok(())
    }
}

pub fn demo_dataset() -> SeedDataset {
    let footwear = CategoryId("cat-footwear".to_string());
    let jackets = CategoryId("cat-jackets".to_string());
    let camping = CategoryId("cat-camping".to_string());

    let categories = vec![
        Category {
            id: footwear.clone(),
            name: "Footwear".to_string(),
            slug: "footwear".to_string(),
            description: "Boots and trail shoes for every terrain".to_string(),
        },
        Category {
            id: jackets.clone(),
            name: "Jackets".to_string(),
            slug: "jackets".to_string(),
            description: "Shells, parkas, and insulation layers".to_string(),
        },
        Category {
            id: camping.clone(),
            name: "Camping".to_string(),
            slug: "camping".to_string(),
            description: "Tents, sleeping bags, and basecamp gear".to_string(),
        },
    ];

    let products = vec![
        product(
            "prod-boots-001",
            "TrailBlazer Hiking Boots",
            "trailblazer-hiking-boots",
            "Waterproof full-grain leather hiking boots with a Vibram outsole, built for \
             multi-day alpine routes and heavy packs.",
            Decimal::new(12_999, 2),
            &footwear,
            42,
            &["Gore-Tex lining", "Vibram Megagrip outsole", "Full-grain leather"],
            4.7,
            212,
        ),
        product(
            "prod-shoes-002",
            "Ridge Runner Trail Shoes",
            "ridge-runner-trail-shoes",
            "Lightweight trail runners with a rock plate and breathable mesh upper for \
             fast-and-light summer missions.",
            Decimal::new(8_950, 2),
            &footwear,
            67,
            &["Rock plate", "Breathable mesh", "290g per shoe"],
            4.4,
            98,
        ),
        product(
            "prod-shell-003",
            "Summit Shell Jacket",
            "summit-shell-jacket",
            "Three-layer hardshell jacket with pit zips and a helmet-compatible hood, \
             tested in sustained storm conditions.",
            Decimal::new(24_900, 2),
            &jackets,
            23,
            &["3-layer hardshell", "Helmet-compatible hood", "Pit zips"],
            4.8,
            154,
        ),
        product(
            "prod-parka-004",
            "Basecamp Down Parka",
            "basecamp-down-parka",
            "800-fill down parka sized to layer over everything you own, for belay \
             ledges and frozen basecamps.",
            Decimal::new(31_900, 2),
            &jackets,
            12,
            &["800-fill down", "RDS certified", "Two-way zip"],
            4.6,
            76,
        ),
        product(
            "prod-tent-005",
            "Scout Two-Person Tent",
            "scout-two-person-tent",
            "Freestanding two-person backpacking tent with twin vestibules and a \
             sub-two-kilogram trail weight.",
            Decimal::new(19_950, 2),
            &camping,
            31,
            &["Freestanding", "Twin vestibules", "1.9kg trail weight"],
            4.5,
            131,
        ),
        product(
            "prod-bag-006",
            "Ember 15 Sleeping Bag",
            "ember-15-sleeping-bag",
            "15-degree down mummy bag with a draft collar and water-resistant shell \
             fabric for shoulder-season nights.",
            Decimal::new(16_450, 2),
            &camping,
            27,
            &["650-fill down", "Draft collar", "Comfort to -9C"],
            4.3,
            64,
        ),
    ];

    let users = vec![User {
        id: UserId("user_123".to_string()),
        name: "Alex Rivers".to_string(),
        email: "alex@example.com".to_string(),
    }];

    let orders = vec![
        Order {
            id: OrderId("ord-1001".to_string()),
            user_id: UserId("user_123".to_string()),
            status: OrderStatus::Shipped,
            items: vec![OrderItem {
                product_id: ProductId("prod-boots-001".to_string()),
                quantity: 1,
                price_at_purchase: Decimal::new(12_999, 2),
            }],
            total: Decimal::new(12_999, 2),
            currency: "USD".to_string(),
            tracking_number: Some("1Z999AA10123456784".to_string()),
            created_at: Utc.with_ymd_and_hms(2026, 7, 28, 14, 30, 0).unwrap(),
        },
        Order {
            id: OrderId("ord-1002".to_string()),
            user_id: UserId("user_123".to_string()),
            status: OrderStatus::Delivered,
            items: vec![OrderItem {
                product_id: ProductId("prod-tent-005".to_string()),
                quantity: 1,
                price_at_purchase: Decimal::new(19_950, 2),
            }],
            total: Decimal::new(19_950, 2),
            currency: "USD".to_string(),
            tracking_number: None,
            created_at: Utc.with_ymd_and_hms(2026, 6, 12, 9, 15, 0).unwrap(),
        },
    ];

    SeedDataset { products, categories, users, orders }
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: &str,
    name: &str,
    slug: &str,
    description: &str,
    price: Decimal,
    category_id: &CategoryId,
    stock: u32,
    features: &[&str],
    rating: f32,
    reviews_count: u32,
) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        slug: slug.to_string(),
        description: description.to_string(),
        price,
        currency: "USD".to_string(),
        category_id: category_id.clone(),
        stock,
        images: vec![format!("/static/images/{slug}.jpg")],
        features: features.iter().map(|feature| feature.to_string()).collect(),
        rating,
        reviews_count,
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), CatalogError> {
    let raw = serde_json::to_string_pretty(value)
        .map_err(|source| CatalogError::ParseFile { path: path.display().to_string(), source })?;
    std::fs::write(path, raw)
        .map_err(|source| CatalogError::WriteFile { path: path.display().to_string(), source })
}
