//! Category catalog handler

use std::sync::Arc;

use axum::{extract::State, Extension, Json};

use crate::{AppError, AppState, AuthUser};
use recurwise_core::models::{category_catalog, CategoryInfo};

/// GET /api/categories - The category catalog, in display order
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<CategoryInfo>>, AppError> {
    state
        .db
        .log_audit(&auth.user, "list", Some("category"), None, None)?;

    Ok(Json(category_catalog()))
}
