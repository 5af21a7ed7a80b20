use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::entities::sync::{SyncReportResponse, SyncStatusResponse};

/// Pull the server's profile and recent meals, then push the meals back
#[utoipa::path(
    post,
    path = "/api/v1/sync",
    responses(
        (status = 200, description = "Sync completed", body = SyncReportResponse),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 502, description = "The sync service failed", body = ErrorResponse),
        (status = 503, description = "The sync service is unreachable", body = ErrorResponse)
    ),
    tag = "sync"
)]
#[instrument(skip(state))]
pub async fn full_sync(State(state): State<AppState>) -> Result<Json<SyncReportResponse>, ApiError> {
    let report = state.app.sync.full_sync().await?;
    info!(
        "Manual sync: {} meals pulled, {} pushed",
        report.meals_pulled, report.meals_pushed
    );
    Ok(Json(report.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/sync/status",
    responses(
        (status = 200, description = "Sync status", body = SyncStatusResponse)
    ),
    tag = "sync"
)]
#[instrument(skip(state))]
pub async fn sync_status(State(state): State<AppState>) -> Json<SyncStatusResponse> {
    let user = state.app.user.snapshot();
    Json(SyncStatusResponse {
        status: user.sync_status,
        last_sync_at: user.last_sync_at,
        authenticated: state.app.session.is_authenticated(),
    })
}
