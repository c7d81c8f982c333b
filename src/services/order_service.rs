use std::sync::Arc;

use serde_json::Value;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    models::{Order, OrderStatus},
    notify::{self, NotificationGateway, OrderNotification},
    routes::orders::PlaceOrderRequest,
    services::cart_service,
};

pub async fn list_orders(pool: &DbPool, user_id: &str) -> AppResult<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

pub async fn list_all_orders(pool: &DbPool) -> AppResult<Vec<Order>> {
    let orders =
        sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY created_at DESC, id DESC")
            .fetch_all(pool)
            .await?;

    Ok(orders)
}

/// Checkout: validate input, persist the order, clear the cart, fire the
/// merchant notification.
///
/// The order insert must succeed before anything else happens; if it fails
/// the cart is untouched and the caller sees the failure. A cart-clear
/// failure after that point leaves the order committed and is only logged.
/// The notification runs detached and can neither block nor fail the call.
pub async fn place_order(
    pool: &DbPool,
    notifier: Arc<dyn NotificationGateway>,
    user_id: &str,
    payload: PlaceOrderRequest,
) -> AppResult<i64> {
    let items = match payload.items {
        None | Some(Value::Null) => {
            return Err(AppError::BadRequest("items and total required".to_string()));
        }
        Some(Value::String(raw)) if raw.is_empty() => {
            return Err(AppError::BadRequest("items and total required".to_string()));
        }
        Some(value) => value,
    };
    let total = payload
        .total
        .ok_or_else(|| AppError::BadRequest("items and total required".to_string()))?;

    // The snapshot is stored verbatim and the submitted total is trusted
    // as-is; nothing is recomputed from live product rows.
    let items_json = normalize_items(&items);

    let order_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO orders (user_id, user_name, user_phone, user_address, items, total, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(payload.user_name.as_deref())
    .bind(payload.user_phone.as_deref())
    .bind(payload.user_address.as_deref())
    .bind(&items_json)
    .bind(total)
    .bind(OrderStatus::Pending)
    .fetch_one(pool)
    .await?;

    // Unconditional clear: rows added since the client read its cart are
    // wiped along with the ordered ones. The order is already durable, so a
    // failure here only gets logged.
    if let Err(err) = cart_service::clear_cart(pool, user_id).await {
        tracing::warn!(error = %err, user_id, order_id, "cart clear failed after order insert");
    }

    let note = OrderNotification {
        order_id,
        user_id: user_id.to_string(),
        user_name: payload.user_name,
        user_phone: payload.user_phone,
        total,
        item_count: count_items(&items_json),
    };
    let _ = notify::dispatch(notifier, note);

    Ok(order_id)
}

pub async fn update_order_status(
    pool: &DbPool,
    order_id: i64,
    status: &str,
) -> AppResult<OrderStatus> {
    let status = OrderStatus::parse(status)
        .ok_or_else(|| AppError::BadRequest("invalid status".to_string()))?;

    let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status)
        .bind(order_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(status)
}

/// Canonical serialized form of the submitted snapshot. Pre-serialized
/// payloads pass through verbatim.
fn normalize_items(items: &Value) -> String {
    match items {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Total item count across the snapshot; an entry without a quantity counts
/// as one, an unparseable snapshot counts zero.
fn count_items(items_json: &str) -> i64 {
    serde_json::from_str::<Vec<Value>>(items_json)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| entry.get("quantity").and_then(Value::as_i64).unwrap_or(1))
                .sum()
        })
        .unwrap_or(0)
}
