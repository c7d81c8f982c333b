use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, state::AppState};

pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Proof that the request carried the configured admin secret. When no secret
/// is configured the check passes for every request: the admin surface runs
/// in an explicit open mode, not an error state.
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.admin_secret.as_deref() else {
            return Ok(AdminGuard);
        };

        let supplied = parts
            .headers
            .get(ADMIN_SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        if supplied != Some(expected) {
            return Err(AppError::Unauthorized);
        }

        Ok(AdminGuard)
    }
}
