use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    services::cart_service::{self, CartItemWithProduct},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Option<i64>,
    pub size: Option<String>,
    pub quantity: Option<i64>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(cart_list).post(add_to_cart))
        .route("/{user_id}/{item_id}", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart/{user_id}",
    params(
        ("user_id" = String, Path, description = "Opaque user identity")
    ),
    responses(
        (status = 200, description = "Cart items joined with current product fields", body = Vec<CartItemWithProduct>)
    ),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<CartItemWithProduct>>> {
    let items = cart_service::list_cart(&state.pool, &user_id).await?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/api/cart/{user_id}",
    params(
        ("user_id" = String, Path, description = "Opaque user identity")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 201, description = "Item added"),
        (status = 400, description = "product_id or size missing"),
    ),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    cart_service::add_to_cart(&state.pool, &user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "ok": true }))))
}

#[utoipa::path(
    delete,
    path = "/api/cart/{user_id}/{item_id}",
    params(
        ("user_id" = String, Path, description = "Opaque user identity"),
        ("item_id" = i64, Path, description = "Cart item ID")
    ),
    responses(
        (status = 200, description = "Item removed"),
        (status = 404, description = "No row matches both item and user"),
    ),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path((user_id, item_id)): Path<(String, i64)>,
) -> AppResult<Json<serde_json::Value>> {
    cart_service::remove_from_cart(&state.pool, &user_id, item_id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
