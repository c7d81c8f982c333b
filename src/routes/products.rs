use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    middleware::admin::AdminGuard,
    models::Product,
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub store_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub sizes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub store_id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub sizes: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            axum::routing::get(list_products).post(create_product),
        )
        .route(
            "/{id}",
            axum::routing::get(get_product)
                .patch(update_product)
                .delete(delete_product),
        )
}

#[utoipa::path(
    get,
    path = "/api/products",
    responses(
        (status = 200, description = "List products", body = Vec<Product>)
    ),
    tag = "Products"
)]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(products))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = Product),
        (status = 404, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };
    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Missing name or negative price"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("admin_secret" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    _guard: AdminGuard,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("name required".to_string()))?;
    let price = payload
        .price
        .ok_or_else(|| AppError::BadRequest("price required".to_string()))?;
    if price < 0 {
        return Err(AppError::BadRequest("price must be >= 0".to_string()));
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO products (store_id, name, description, price, image_url, category, sizes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(payload.store_id.unwrap_or(1))
    .bind(&name)
    .bind(payload.description.as_deref())
    .bind(price)
    .bind(payload.image_url.as_deref())
    .bind(payload.category.as_deref().unwrap_or("tee"))
    .bind(payload.sizes.as_deref())
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id, "ok": true })),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, description = "Empty name or negative price"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found"),
    ),
    security(("admin_secret" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    _guard: AdminGuard,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let existing = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::BadRequest("name must not be empty".to_string()));
    }
    if payload.price.is_some_and(|p| p < 0) {
        return Err(AppError::BadRequest("price must be >= 0".to_string()));
    }

    let store_id = payload.store_id.unwrap_or(existing.store_id);
    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .unwrap_or(existing.name);
    let description = payload.description.or(existing.description);
    let price = payload.price.unwrap_or(existing.price);
    let image_url = payload.image_url.or(existing.image_url);
    let category = payload.category.unwrap_or(existing.category);
    let sizes = payload.sizes.or(existing.sizes);

    sqlx::query(
        r#"
        UPDATE products
        SET store_id = ?, name = ?, description = ?, price = ?, image_url = ?, category = ?, sizes = ?
        WHERE id = ?
        "#,
    )
    .bind(store_id)
    .bind(&name)
    .bind(description.as_deref())
    .bind(price)
    .bind(image_url.as_deref())
    .bind(&category)
    .bind(sizes.as_deref())
    .bind(id)
    .execute(&state.pool)
    .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted; order snapshots keep their copies"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found"),
    ),
    security(("admin_secret" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    _guard: AdminGuard,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}
