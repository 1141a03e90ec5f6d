//! Export and backup/import handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Response, StatusCode},
    Extension, Json,
};
use tracing::info;

use crate::{AppError, AppState, AuthUser};
use recurwise_core::export::{ImportStats, SubscriptionBackup};

/// GET /api/export/csv - Export the caller's subscriptions as CSV
pub async fn export_csv(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response<Body>, AppError> {
    let csv = state.db.export_subscriptions_csv(&auth.user)?;
    let rows = csv.lines().count().saturating_sub(1);
    info!("Exported {} subscriptions to CSV", rows);

    state.db.log_audit(
        &auth.user,
        "export_csv",
        Some("subscription"),
        None,
        Some(&format!("rows={}", rows)),
    )?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"subscriptions.csv\"",
        )
        .body(Body::from(csv))
        .map_err(|e| AppError::internal(&e.to_string()))
}

/// GET /api/export/json - Export the caller's subscriptions as a JSON backup
pub async fn export_json(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Response<Body>, AppError> {
    let backup = state.db.export_backup(&auth.user)?;

    state.db.log_audit(
        &auth.user,
        "export_json",
        Some("subscription"),
        None,
        Some(&format!(
            "version={}, count={}",
            backup.version,
            backup.subscriptions.len()
        )),
    )?;

    let json =
        serde_json::to_string_pretty(&backup).map_err(|e| AppError::internal(&e.to_string()))?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"recurwise-backup-{}.json\"",
                backup.exported_at.format("%Y-%m-%d")
            ),
        )
        .body(Body::from(json))
        .map_err(|e| AppError::internal(&e.to_string()))
}

/// POST /api/import/json - Import a JSON backup into the caller's records
pub async fn import_json(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    body: String,
) -> Result<Json<ImportStats>, AppError> {
    let backup = SubscriptionBackup::from_json(&body).map_err(|e| match e {
        recurwise_core::Error::Json(e) => AppError::bad_request(&format!("Invalid JSON: {}", e)),
        other => AppError::from(other),
    })?;

    info!(
        "Importing backup: version={}, records={}",
        backup.version,
        backup.subscriptions.len()
    );

    let stats = state.db.import_backup(&auth.user, &backup)?;

    state.db.log_audit(
        &auth.user,
        "import_json",
        Some("subscription"),
        None,
        Some(&format!(
            "imported={}, skipped={}",
            stats.imported, stats.skipped
        )),
    )?;

    Ok(Json(stats))
}
