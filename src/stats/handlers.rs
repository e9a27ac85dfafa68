use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::models::GlobalStatistics;
use super::service::StatsService;
use crate::account::models::UserStatistics;
use crate::shared::{AppError, AppState};

fn stats_service(state: &AppState) -> StatsService {
    StatsService::new(
        Arc::clone(&state.catalog_repository),
        Arc::clone(&state.account_repository),
        Arc::clone(&state.history_repository),
        Arc::clone(&state.stats_cache),
    )
}

/// HTTP handler for one account's statistics
///
/// GET /accounts/:id/statistics
/// Rebuilds from the history log unless a cached copy is current.
#[instrument(name = "get_account_statistics", skip(state))]
pub async fn get_account_statistics(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<UserStatistics>, AppError> {
    let statistics = stats_service(&state)
        .account_statistics(&account_id)
        .await?;
    Ok(Json(statistics))
}

/// HTTP handler for global statistics
///
/// GET /statistics
#[instrument(name = "get_global_statistics", skip(state))]
pub async fn get_global_statistics(
    State(state): State<AppState>,
) -> Result<Json<GlobalStatistics>, AppError> {
    let statistics = stats_service(&state).global_statistics().await?;
    Ok(Json(statistics))
}
