//! Dashboard and spend summary handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use super::AsOfQuery;
use crate::{AppError, AppState, AuthUser};
use recurwise_core::models::{Dashboard, SpendSummary};
use recurwise_core::{build_dashboard, spend, SubscriptionStore};

/// GET /api/dashboard - Projected renewals plus spend summary
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let as_of = query.resolve()?;

    let dashboard = build_dashboard(&state.db, &auth.user, as_of)?;

    state.db.log_audit(
        &auth.user,
        "view",
        Some("dashboard"),
        None,
        Some(&format!("as_of={}", as_of.to_rfc3339())),
    )?;

    Ok(Json(dashboard))
}

/// GET /api/summary - Monthly/yearly totals and ranked categories
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<SpendSummary>, AppError> {
    let subscriptions = state.db.list_subscriptions(&auth.user)?;
    let summary = spend::summarize(&subscriptions);

    state
        .db
        .log_audit(&auth.user, "view", Some("summary"), None, None)?;

    Ok(Json(summary))
}
