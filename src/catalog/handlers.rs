use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, instrument};

use super::models::{CardModel, CardPackModel, CardTemplateModel};
use super::repository::CatalogRepository;
use super::schema;
use crate::gacha::validation;
use crate::shared::{AppError, AppState};

/// HTTP handler for listing all cards
///
/// GET /cards
#[instrument(name = "list_cards", skip(state))]
pub async fn list_cards(
    State(state): State<AppState>,
) -> Result<Json<Vec<CardModel>>, AppError> {
    let cards = state.catalog_repository.get_cards().await?;
    Ok(Json(cards))
}

/// HTTP handler for fetching one card
///
/// GET /cards/:id
#[instrument(name = "get_card", skip(state))]
pub async fn get_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<Json<CardModel>, AppError> {
    let card = state
        .catalog_repository
        .get_card(&card_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Card {card_id} not found")))?;
    Ok(Json(card))
}

/// HTTP handler for creating or updating a card
///
/// PUT /cards
/// The card's attribute bag is validated against its template's schema
/// before the write is accepted.
#[instrument(name = "upsert_card", skip(state, card))]
pub async fn upsert_card(
    State(state): State<AppState>,
    Json(mut card): Json<CardModel>,
) -> Result<Json<CardModel>, AppError> {
    info!(card_id = %card.id, template_id = %card.template_id, "Upserting card");

    let template = state
        .catalog_repository
        .get_template(&card.template_id)
        .await?
        .ok_or_else(|| {
            AppError::BadRequest(format!("Unknown card template {}", card.template_id))
        })?;

    schema::validate_attributes(&template, &card)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    card.updated_at = Utc::now();
    state.catalog_repository.upsert_card(&card).await?;

    Ok(Json(card))
}

/// HTTP handler for deleting a card
///
/// DELETE /cards/:id
#[instrument(name = "delete_card", skip(state))]
pub async fn delete_card(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
) -> Result<(), AppError> {
    info!(card_id = %card_id, "Deleting card");
    state.catalog_repository.delete_card(&card_id).await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
pub struct PackListQuery {
    /// Admin views pass true to see deactivated packs as well.
    #[serde(default)]
    pub include_inactive: bool,
}

/// HTTP handler for listing packs
///
/// GET /packs
/// Inactive packs are hidden unless `include_inactive=true`.
#[instrument(name = "list_packs", skip(state))]
pub async fn list_packs(
    State(state): State<AppState>,
    Query(query): Query<PackListQuery>,
) -> Result<Json<Vec<CardPackModel>>, AppError> {
    let packs = state.catalog_repository.get_packs().await?;
    let packs = packs
        .into_iter()
        .filter(|pack| query.include_inactive || pack.is_active)
        .collect();
    Ok(Json(packs))
}

/// HTTP handler for fetching one pack
///
/// GET /packs/:id
#[instrument(name = "get_pack", skip(state))]
pub async fn get_pack(
    State(state): State<AppState>,
    Path(pack_id): Path<String>,
) -> Result<Json<CardPackModel>, AppError> {
    let pack = state
        .catalog_repository
        .get_pack(&pack_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Pack {pack_id} not found")))?;
    Ok(Json(pack))
}

/// HTTP handler for creating or updating a pack
///
/// PUT /packs
/// The probability table and pity configuration are validated before the
/// write, so a misconfigured pack never becomes drawable.
#[instrument(name = "upsert_pack", skip(state, pack))]
pub async fn upsert_pack(
    State(state): State<AppState>,
    Json(mut pack): Json<CardPackModel>,
) -> Result<Json<CardPackModel>, AppError> {
    info!(pack_id = %pack.id, "Upserting pack");

    validation::validate_pack(&pack)?;

    pack.updated_at = Utc::now();
    state.catalog_repository.upsert_pack(&pack).await?;

    Ok(Json(pack))
}

/// HTTP handler for deleting a pack
///
/// DELETE /packs/:id
/// History records denormalize pack metadata, so past batches survive this.
#[instrument(name = "delete_pack", skip(state))]
pub async fn delete_pack(
    State(state): State<AppState>,
    Path(pack_id): Path<String>,
) -> Result<(), AppError> {
    info!(pack_id = %pack_id, "Deleting pack");
    state.catalog_repository.delete_pack(&pack_id).await?;
    Ok(())
}

/// HTTP handler for listing card templates
///
/// GET /templates
#[instrument(name = "list_templates", skip(state))]
pub async fn list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CardTemplateModel>>, AppError> {
    let templates = state.catalog_repository.get_templates().await?;
    Ok(Json(templates))
}

/// HTTP handler for creating or updating a card template
///
/// PUT /templates
#[instrument(name = "upsert_template", skip(state, template))]
pub async fn upsert_template(
    State(state): State<AppState>,
    Json(mut template): Json<CardTemplateModel>,
) -> Result<Json<CardTemplateModel>, AppError> {
    info!(template_id = %template.id, "Upserting template");

    template.updated_at = Utc::now();
    state.catalog_repository.upsert_template(&template).await?;

    Ok(Json(template))
}
