use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, AppResult},
    models::{Review, ReviewComment},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub rating: Option<i64>,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewWithComments {
    #[serde(flatten)]
    pub review: Review,
    pub comments: Vec<ReviewComment>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_reviews).post(create_review))
        .route("/{review_id}/comments", post(create_comment))
}

#[utoipa::path(
    get,
    path = "/api/reviews",
    responses(
        (status = 200, description = "Reviews newest first, comments oldest first", body = Vec<ReviewWithComments>)
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ReviewWithComments>>> {
    let reviews = sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews ORDER BY created_at DESC, id DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    let comments = sqlx::query_as::<_, ReviewComment>(
        "SELECT * FROM review_comments ORDER BY created_at ASC, id ASC",
    )
    .fetch_all(&state.pool)
    .await?;

    let mut by_review: HashMap<i64, Vec<ReviewComment>> = HashMap::new();
    for comment in comments {
        by_review.entry(comment.review_id).or_default().push(comment);
    }

    let result = reviews
        .into_iter()
        .map(|review| {
            let comments = by_review.remove(&review.id).unwrap_or_default();
            ReviewWithComments { review, comments }
        })
        .collect();

    Ok(Json(result))
}

#[utoipa::path(
    post,
    path = "/api/reviews",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created"),
        (status = 400, description = "Missing user_id or text"),
    ),
    tag = "Reviews"
)]
pub async fn create_review(
    State(state): State<AppState>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let user_id = payload
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::BadRequest("user_id and text required".to_string()))?;
    let text = payload
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("user_id and text required".to_string()))?;
    let user_name = payload.user_name.unwrap_or_else(|| "Guest".to_string());
    let rating = clamp_rating(payload.rating);

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO reviews (user_id, user_name, rating, text) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(&user_id)
    .bind(&user_name)
    .bind(rating)
    .bind(&text)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id, "ok": true })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/reviews/{review_id}/comments",
    params(
        ("review_id" = i64, Path, description = "Review ID")
    ),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created"),
        (status = 400, description = "Missing user_id or text"),
    ),
    tag = "Reviews"
)]
pub async fn create_comment(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let user_id = payload
        .user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::BadRequest("user_id and text required".to_string()))?;
    let text = payload
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("user_id and text required".to_string()))?;
    let user_name = payload.user_name.unwrap_or_else(|| "Guest".to_string());

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO review_comments (review_id, user_id, user_name, text)
        VALUES (?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(review_id)
    .bind(&user_id)
    .bind(&user_name)
    .bind(&text)
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id, "ok": true })),
    ))
}

/// Ratings land in [1, 5]; absent ratings default to 5.
fn clamp_rating(rating: Option<i64>) -> i64 {
    rating.unwrap_or(5).clamp(1, 5)
}
