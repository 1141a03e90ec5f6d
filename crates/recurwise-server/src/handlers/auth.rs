//! Authentication-related handlers

use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::{AppError, AppState, AuthMethod, AuthUser};

/// Response for the /api/me endpoint
#[derive(Serialize)]
pub struct MeResponse {
    /// The authenticated user's email or identifier
    pub user: String,
    /// How the user was authenticated
    pub auth_method: AuthMethod,
}

/// GET /api/me - Get the currently authenticated user
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MeResponse>, AppError> {
    state.db.log_audit(
        &auth.user,
        "view",
        Some("me"),
        None,
        Some(&format!("auth_method={}", auth.method.as_str())),
    )?;

    Ok(Json(MeResponse {
        user: auth.user,
        auth_method: auth.method,
    }))
}
