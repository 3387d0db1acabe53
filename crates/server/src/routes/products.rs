use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use outfitter_core::{Product, ProductId};

use super::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Json<Vec<Product>> {
    let products = state
        .catalog
        .search(query.search.as_deref().unwrap_or(""), query.category.as_deref())
        .await;
    Json(products)
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .catalog
        .get_by_id(&ProductId(product_id))
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product not found"))
}

pub async fn get_product_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .catalog
        .get_by_slug(&slug)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product not found"))
}
