use axum::{
    extract::{Path, State},
    Json,
};
use tracing::instrument;

use super::models::GachaRecordModel;
use super::repository::HistoryRepository;
use crate::account::repository::AccountRepository;
use crate::shared::{AppError, AppState};

/// HTTP handler for an account's draw history
///
/// GET /accounts/:id/history
/// Returns batch records newest first. Pack metadata inside each record is
/// a write-time snapshot, so edits and deletions of the pack after the fact
/// do not change what is returned here.
#[instrument(name = "get_account_history", skip(state))]
pub async fn get_account_history(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<Vec<GachaRecordModel>>, AppError> {
    state
        .account_repository
        .get_account(&account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account {account_id} not found")))?;

    let records = state
        .history_repository
        .get_for_account(&account_id)
        .await?;
    Ok(Json(records))
}
