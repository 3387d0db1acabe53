use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use outfitter_core::{Order, UserId};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderQuery {
    pub user_id: String,
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Json<Vec<Order>> {
    Json(state.orders.orders_for_user(&UserId(query.user_id)).await)
}
