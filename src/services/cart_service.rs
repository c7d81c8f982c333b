use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::{
    db::DbPool,
    error::{AppError, AppResult},
    routes::cart::AddToCartRequest,
};

/// Cart row joined with the product's current fields. The view reflects the
/// catalog as of the read, not as of the add: a price change after the item
/// was added shows the new price.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct CartItemWithProduct {
    pub id: i64,
    pub user_id: String,
    pub product_id: i64,
    pub size: String,
    pub quantity: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub image_url: Option<String>,
    pub category: String,
    pub sizes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Unknown users simply get an empty list.
pub async fn list_cart(pool: &DbPool, user_id: &str) -> AppResult<Vec<CartItemWithProduct>> {
    let items = sqlx::query_as::<_, CartItemWithProduct>(
        r#"
        SELECT ci.id, ci.user_id, ci.product_id, ci.size, ci.quantity, ci.created_at,
               p.name, p.description, p.price, p.image_url, p.category, p.sizes
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = ?
        ORDER BY ci.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Repeated adds create additional rows; quantities are not merged. The
/// product id and size are recorded as submitted, without checking the
/// catalog — the cart view join drops rows whose product has vanished.
pub async fn add_to_cart(pool: &DbPool, user_id: &str, payload: AddToCartRequest) -> AppResult<()> {
    let product_id = payload
        .product_id
        .ok_or_else(|| AppError::BadRequest("product_id and size required".to_string()))?;
    let size = payload
        .size
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("product_id and size required".to_string()))?;
    let quantity = payload.quantity.unwrap_or(1);

    sqlx::query("INSERT INTO cart_items (user_id, product_id, size, quantity) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(product_id)
        .bind(&size)
        .bind(quantity)
        .execute(pool)
        .await?;

    Ok(())
}

/// The row must match both the item id and the owning user.
pub async fn remove_from_cart(pool: &DbPool, user_id: &str, item_id: i64) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM cart_items WHERE id = ? AND user_id = ?")
        .bind(item_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(())
}

/// Unconditional wipe of a user's cart. Clearing an empty cart is a no-op.
pub async fn clear_cart(pool: &DbPool, user_id: &str) -> AppResult<()> {
    sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
