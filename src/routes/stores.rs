use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    middleware::admin::AdminGuard,
    models::{Product, Store},
    state::AppState,
};

/// Products reassigned on store deletion fall back to this id when no other
/// store remains.
const DEFAULT_STORE_ID: i64 = 1;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateStoreRequest {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route(
            "/{id}",
            axum::routing::patch(update_store).delete(delete_store),
        )
        .route("/{id}/products", get(store_products))
}

#[utoipa::path(
    get,
    path = "/api/stores",
    responses(
        (status = 200, description = "List stores", body = Vec<Store>)
    ),
    tag = "Stores"
)]
pub async fn list_stores(State(state): State<AppState>) -> AppResult<Json<Vec<Store>>> {
    let stores = sqlx::query_as::<_, Store>("SELECT * FROM stores ORDER BY id")
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(stores))
}

#[utoipa::path(
    get,
    path = "/api/stores/{id}/products",
    params(
        ("id" = i64, Path, description = "Store ID")
    ),
    responses(
        (status = 200, description = "Products belonging to the store", body = Vec<Product>)
    ),
    tag = "Stores"
)]
pub async fn store_products(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Product>>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE store_id = ? ORDER BY id")
        .bind(id)
        .fetch_all(&state.pool)
        .await?;
    Ok(Json(products))
}

#[utoipa::path(
    post,
    path = "/api/stores",
    request_body = CreateStoreRequest,
    responses(
        (status = 201, description = "Store created"),
        (status = 400, description = "Missing name"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("admin_secret" = [])),
    tag = "Stores"
)]
pub async fn create_store(
    State(state): State<AppState>,
    _guard: AdminGuard,
    Json(payload): Json<CreateStoreRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("name required".to_string()))?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO stores (name, image_url, description) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(&name)
    .bind(trimmed_or_none(payload.image_url).as_deref())
    .bind(trimmed_or_none(payload.description).as_deref())
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id, "ok": true })),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/stores/{id}",
    params(
        ("id" = i64, Path, description = "Store ID")
    ),
    request_body = UpdateStoreRequest,
    responses(
        (status = 200, description = "Store updated"),
        (status = 400, description = "No fields to update"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Store not found"),
    ),
    security(("admin_secret" = [])),
    tag = "Stores"
)]
pub async fn update_store(
    State(state): State<AppState>,
    _guard: AdminGuard,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStoreRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if payload.name.is_none() && payload.image_url.is_none() && payload.description.is_none() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let existing = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    let existing = match existing {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .unwrap_or(existing.name);
    let image_url = match payload.image_url {
        Some(value) => trimmed_or_none(Some(value)),
        None => existing.image_url,
    };
    let description = match payload.description {
        Some(value) => trimmed_or_none(Some(value)),
        None => existing.description,
    };

    sqlx::query("UPDATE stores SET name = ?, image_url = ?, description = ? WHERE id = ?")
        .bind(&name)
        .bind(image_url.as_deref())
        .bind(description.as_deref())
        .bind(id)
        .execute(&state.pool)
        .await?;

    Ok(Json(serde_json::json!({ "ok": true })))
}

#[utoipa::path(
    delete,
    path = "/api/stores/{id}",
    params(
        ("id" = i64, Path, description = "Store ID")
    ),
    responses(
        (status = 200, description = "Store deleted; its products move to the fallback store"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Store not found"),
    ),
    security(("admin_secret" = [])),
    tag = "Stores"
)]
pub async fn delete_store(
    State(state): State<AppState>,
    _guard: AdminGuard,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    // Products are never deleted with their store: they move to the lowest-id
    // remaining store, or to the sentinel default when none remains.
    let fallback: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM stores WHERE id != ? ORDER BY id LIMIT 1")
            .bind(id)
            .fetch_optional(&state.pool)
            .await?;
    let fallback_id = fallback.map(|(fid,)| fid).unwrap_or(DEFAULT_STORE_ID);

    sqlx::query("UPDATE products SET store_id = ? WHERE store_id = ?")
        .bind(fallback_id)
        .bind(id)
        .execute(&state.pool)
        .await?;

    let result = sqlx::query("DELETE FROM stores WHERE id = ?")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}

fn trimmed_or_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
