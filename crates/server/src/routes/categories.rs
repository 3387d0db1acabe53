use axum::extract::State;
use axum::Json;

use outfitter_core::Category;

use super::AppState;

pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.catalog.list_categories().await)
}
