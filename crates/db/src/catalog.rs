use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use outfitter_core::{Category, Order, Product, ProductId, User, UserId};

use crate::fixtures::{demo_dataset, SeedDataset};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read data file `{path}`: {source}")]
    ReadFile { path: String, source: std::io::Error },
    #[error("could not parse data file `{path}`: {source}")]
    ParseFile { path: String, source: serde_json::Error },
    #[error("could not write data file `{path}`: {source}")]
    WriteFile { path: String, source: std::io::Error },
}

/// Keyed lookup over the product catalog. Simple by contract: handlers treat
/// this as an external capability and never see how it is backed.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn search(&self, query: &str, category: Option<&str>) -> Vec<Product>;
    async fn get_by_id(&self, id: &ProductId) -> Option<Product>;
    async fn get_by_slug(&self, slug: &str) -> Option<Product>;
    async fn list_categories(&self) -> Vec<Category>;
}

#[async_trait]
pub trait OrderService: Send + Sync {
    async fn orders_for_user(&self, user_id: &UserId) -> Vec<Order>;
}

/// In-memory catalog loaded once at startup, either from the JSON data
/// directory or from the embedded demo dataset.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
    categories: Vec<Category>,
    users: Vec<User>,
    orders: Vec<Order>,
}

impl StaticCatalog {
    pub fn from_parts(
        products: Vec<Product>,
        categories: Vec<Category>,
        users: Vec<User>,
        orders: Vec<Order>,
    ) -> Self {
        Self { products, categories, users, orders }
    }

    pub fn from_seed() -> Self {
        let SeedDataset { products, categories, users, orders } = demo_dataset();
        Self { products, categories, users, orders }
    }

    /// Load `products.json` and `categories.json` (required) plus
    /// `users.json` and `orders.json` (optional) from a data directory.
    pub fn from_data_dir(dir: &Path) -> Result<Self, CatalogError> {
        Ok(Self {
            products: read_json(&dir.join("products.json"))?,
            categories: read_json(&dir.join("categories.json"))?,
            users: read_json_or_default(&dir.join("users.json"))?,
            orders: read_json_or_default(&dir.join("orders.json"))?,
        })
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn user(&self, user_id: &UserId) -> Option<&User> {
        self.users.iter().find(|user| &user.id == user_id)
    }

    fn category_id_for_slug(&self, slug: &str) -> Option<&outfitter_core::CategoryId> {
        self.categories.iter().find(|category| category.slug == slug).map(|category| &category.id)
    }
}

#[async_trait]
impl CatalogService for StaticCatalog {
    async fn search(&self, query: &str, category: Option<&str>) -> Vec<Product> {
        let scoped: Vec<&Product> = match category {
            Some(slug) => match self.category_id_for_slug(slug) {
                Some(category_id) => {
                    self.products.iter().filter(|p| &p.category_id == category_id).collect()
                }
                None => return Vec::new(),
            },
            None => self.products.iter().collect(),
        };

        if query.trim().is_empty() {
            return scoped.into_iter().cloned().collect();
        }

        scoped.into_iter().filter(|product| product.matches(query)).cloned().collect()
    }

    async fn get_by_id(&self, id: &ProductId) -> Option<Product> {
        self.products.iter().find(|product| &product.id == id).cloned()
    }

    async fn get_by_slug(&self, slug: &str) -> Option<Product> {
        self.products.iter().find(|product| product.slug == slug).cloned()
    }

    async fn list_categories(&self) -> Vec<Category> {
        self.categories.clone()
    }
}

#[async_trait]
impl OrderService for StaticCatalog {
    async fn orders_for_user(&self, user_id: &UserId) -> Vec<Order> {
        self.orders.iter().filter(|order| &order.user_id == user_id).cloned().collect()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CatalogError::ParseFile {
        path: path.display().to_string(),
        source,
    })
}

fn read_json_or_default<T>(path: &Path) -> Result<Vec<T>, CatalogError>
where
    T: serde::de::DeserializeOwned,
{
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_json(path)
}

#[cfg(test)]
mod tests {
    use outfitter_core::{ProductId, UserId};

    use super::{CatalogService, OrderService, StaticCatalog};
    use crate::fixtures::demo_dataset;

    #[tokio::test]
    async fn search_matches_case_insensitively() {
        let catalog = StaticCatalog::from_seed();

        let hits = catalog.search("HIKING", None).await;
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|p| p.matches("hiking")));
    }

    #[tokio::test]
    async fn empty_query_returns_whole_scope() {
        let catalog = StaticCatalog::from_seed();
        let all = catalog.search("", None).await;
        assert_eq!(all.len(), catalog.products().len());
    }

    #[tokio::test]
    async fn category_filter_scopes_by_slug() {
        let catalog = StaticCatalog::from_seed();

        let footwear = catalog.search("", Some("footwear")).await;
        assert!(!footwear.is_empty());
        let footwear_id = &footwear[0].category_id;
        assert!(footwear.iter().all(|p| &p.category_id == footwear_id));

        assert!(catalog.search("", Some("no-such-category")).await.is_empty());
    }

    #[tokio::test]
    async fn lookup_by_id_and_slug_agree() {
        let catalog = StaticCatalog::from_seed();
        let first = catalog.products()[0].clone();

        let by_id = catalog.get_by_id(&first.id).await.expect("by id");
        let by_slug = catalog.get_by_slug(&first.slug).await.expect("by slug");
        assert_eq!(by_id, by_slug);

        assert!(catalog.get_by_id(&ProductId("missing".to_string())).await.is_none());
    }

    #[tokio::test]
    async fn orders_are_scoped_to_the_user() {
        let catalog = StaticCatalog::from_seed();

        let orders = catalog.orders_for_user(&UserId("user_123".to_string())).await;
        assert!(!orders.is_empty());
        assert!(orders.iter().all(|order| order.user_id.0 == "user_123"));

        assert!(catalog.orders_for_user(&UserId("stranger".to_string())).await.is_empty());
    }

    #[tokio::test]
    async fn data_dir_round_trip_reloads_the_seed() {
        let dir = tempfile::tempdir().expect("tempdir");
        demo_dataset().write_to_dir(dir.path()).expect("write seed");

        let catalog = StaticCatalog::from_data_dir(dir.path()).expect("load");
        assert_eq!(catalog.products().len(), StaticCatalog::from_seed().products().len());
        assert!(!catalog.list_categories().await.is_empty());
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = StaticCatalog::from_data_dir(dir.path()).expect_err("must fail");
        assert!(error.to_string().contains("products.json"));
    }
}
