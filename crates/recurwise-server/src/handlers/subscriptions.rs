//! Subscription management handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Extension, Json,
};

use super::AsOfQuery;
use crate::{AppError, AppState, AuthUser, SuccessResponse};
use recurwise_core::dashboard::project_views;
use recurwise_core::models::{NewSubscription, Subscription, SubscriptionView};
use recurwise_core::SubscriptionStore;

/// Unwrap a JSON body, turning malformed or invalid fields into a 400
fn json_body(body: Result<Json<NewSubscription>, JsonRejection>) -> Result<NewSubscription, AppError> {
    body.map(|Json(new)| new)
        .map_err(|e| AppError::bad_request(&e.body_text()))
}

/// GET /api/subscriptions - List the caller's subscriptions with projected renewals
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<Vec<SubscriptionView>>, AppError> {
    let as_of = query.resolve()?;

    let views = project_views(state.db.list_subscriptions(&auth.user)?, as_of)?;

    state.db.log_audit(
        &auth.user,
        "list",
        Some("subscription"),
        None,
        Some(&format!("count={}, as_of={}", views.len(), as_of.to_rfc3339())),
    )?;

    Ok(Json(views))
}

/// GET /api/subscriptions/:id - A single subscription with its projected renewal
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<SubscriptionView>, AppError> {
    let as_of = query.resolve()?;

    let subscription = state
        .db
        .get_subscription(&auth.user, &id)?
        .ok_or_else(|| AppError::not_found("Subscription not found"))?;

    state
        .db
        .log_audit(&auth.user, "view", Some("subscription"), Some(&id), None)?;

    let view = project_views(vec![subscription], as_of)?
        .pop()
        .ok_or_else(|| AppError::internal("Projection returned no view"))?;

    Ok(Json(view))
}

/// POST /api/subscriptions - Create a subscription
pub async fn create_subscription(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    body: Result<Json<NewSubscription>, JsonRejection>,
) -> Result<Json<Subscription>, AppError> {
    let new = json_body(body)?;

    let created = state.db.insert_subscription(&auth.user, &new)?;

    state.db.log_audit(
        &auth.user,
        "create",
        Some("subscription"),
        Some(&created.id),
        Some(&format!(
            "title={}, amount={}, frequency={}",
            created.title, created.amount, created.frequency
        )),
    )?;

    Ok(Json(created))
}

/// PUT /api/subscriptions/:id - Replace every editable field of a subscription
pub async fn update_subscription(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    body: Result<Json<NewSubscription>, JsonRejection>,
) -> Result<Json<Subscription>, AppError> {
    let new = json_body(body)?;

    let updated = state.db.update_subscription(&auth.user, &id, &new)?;

    state.db.log_audit(
        &auth.user,
        "update",
        Some("subscription"),
        Some(&id),
        Some(&format!(
            "title={}, amount={}, frequency={}",
            updated.title, updated.amount, updated.frequency
        )),
    )?;

    Ok(Json(updated))
}

/// DELETE /api/subscriptions/:id - Delete a subscription
pub async fn delete_subscription(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.db.delete_subscription(&auth.user, &id)?;

    state
        .db
        .log_audit(&auth.user, "delete", Some("subscription"), Some(&id), None)?;

    Ok(Json(SuccessResponse { success: true }))
}
