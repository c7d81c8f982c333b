use axum::{Json, Router, routing::get};

use crate::{middleware::admin::AdminGuard, state::AppState};

pub fn router() -> Router<AppState> {
    Router::new().route("/verify", get(verify))
}

#[utoipa::path(
    get,
    path = "/api/admin/verify",
    responses(
        (status = 200, description = "Secret matches, or no secret is configured"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("admin_secret" = [])),
    tag = "Admin"
)]
pub async fn verify(_guard: AdminGuard) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}
