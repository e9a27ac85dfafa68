use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::models::{GachaRequest, GachaResult};
use super::service::GachaService;
use crate::shared::{AppError, AppState};

/// HTTP handler for resolving a gacha batch
///
/// POST /gacha
/// Takes {account_id, pack_id, quantity} and returns the full batch result
#[instrument(name = "perform_gacha", skip(state, request))]
pub async fn perform_gacha(
    State(state): State<AppState>,
    Json(request): Json<GachaRequest>,
) -> Result<Json<GachaResult>, AppError> {
    info!(
        account_id = %request.account_id,
        pack_id = %request.pack_id,
        quantity = request.quantity.count(),
        "Resolving gacha batch"
    );

    let service = GachaService::new(
        Arc::clone(&state.catalog_repository),
        Arc::clone(&state.account_repository),
        Arc::clone(&state.collection_repository),
        Arc::clone(&state.pity_repository),
        Arc::clone(&state.history_repository),
        Arc::clone(&state.stats_cache),
    );

    let result = service.perform_gacha(request).await?;

    Ok(Json(result))
}
