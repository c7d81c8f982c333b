use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult, middleware::admin::AdminGuard, models::Order, services::order_service,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub user_name: Option<String>,
    pub user_phone: Option<String>,
    pub user_address: Option<String>,
    /// Either a structured list of cart items or a pre-serialized snapshot.
    #[schema(value_type = Object)]
    pub items: Option<serde_json::Value>,
    pub total: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/all", get(list_all_orders))
        .route("/order/{order_id}/status", patch(update_order_status))
        .route("/{user_id}", get(list_orders).post(place_order))
}

#[utoipa::path(
    get,
    path = "/api/orders/{user_id}",
    params(
        ("user_id" = String, Path, description = "Opaque user identity")
    ),
    responses(
        (status = 200, description = "Orders for the user, newest first", body = Vec<Order>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_service::list_orders(&state.pool, &user_id).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    post,
    path = "/api/orders/{user_id}",
    params(
        ("user_id" = String, Path, description = "Opaque user identity")
    ),
    request_body = PlaceOrderRequest,
    responses(
        (status = 201, description = "Order placed, cart cleared"),
        (status = 400, description = "items or total missing"),
    ),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<PlaceOrderRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let order_id =
        order_service::place_order(&state.pool, state.notifier.clone(), &user_id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "ok": true, "orderId": order_id })),
    ))
}

#[utoipa::path(
    get,
    path = "/api/orders/admin/all",
    responses(
        (status = 200, description = "All orders, newest first", body = Vec<Order>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("admin_secret" = [])),
    tag = "Orders"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    _guard: AdminGuard,
) -> AppResult<Json<Vec<Order>>> {
    let orders = order_service::list_all_orders(&state.pool).await?;
    Ok(Json(orders))
}

#[utoipa::path(
    patch,
    path = "/api/orders/order/{order_id}/status",
    params(
        ("order_id" = i64, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status updated"),
        (status = 400, description = "Status outside the pending/completed set"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No such order"),
    ),
    security(("admin_secret" = [])),
    tag = "Orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    _guard: AdminGuard,
    Path(order_id): Path<i64>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<serde_json::Value>> {
    order_service::update_order_status(&state.pool, order_id, &payload.status).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
