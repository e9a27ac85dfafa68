use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::models::AccountModel;
use super::repository::{AccountRepository, CollectionRepository};
use crate::catalog::models::CardModel;
use crate::catalog::repository::CatalogRepository;
use crate::shared::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct AccountCreateRequest {
    pub username: String,
}

/// One row of an account's collection view: the owned-card ledger entry
/// joined with the card definition it points at.
#[derive(Debug, Serialize)]
pub struct CollectionEntry {
    pub card: CardModel,
    pub quantity: u32,
    pub obtained_at: DateTime<Utc>,
}

/// HTTP handler for creating an account
///
/// POST /accounts
/// Returns the new account with its starting balances
#[instrument(name = "create_account", skip(state))]
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<AccountCreateRequest>,
) -> Result<Json<AccountModel>, AppError> {
    if request.username.trim().is_empty() {
        return Err(AppError::BadRequest("Username cannot be empty".to_string()));
    }

    let account = AccountModel::new(request.username);
    state.account_repository.create_account(&account).await?;

    info!(account_id = %account.id, username = %account.username, "Account created");
    Ok(Json(account))
}

/// HTTP handler for fetching an account
///
/// GET /accounts/:id
#[instrument(name = "get_account", skip(state))]
pub async fn get_account(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountModel>, AppError> {
    let account = state
        .account_repository
        .get_account(&account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account {account_id} not found")))?;
    Ok(Json(account))
}

/// HTTP handler for an account's owned-card collection
///
/// GET /accounts/:id/collection
/// Ledger entries whose card definition has been deleted are dropped from
/// the view; the ledger itself keeps them.
#[instrument(name = "get_collection", skip(state))]
pub async fn get_collection(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<Vec<CollectionEntry>>, AppError> {
    state
        .account_repository
        .get_account(&account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account {account_id} not found")))?;

    let owned = state
        .collection_repository
        .get_owned_cards(&account_id)
        .await?;
    let card_ids: Vec<String> = owned.iter().map(|entry| entry.card_id.clone()).collect();
    let cards = state.catalog_repository.get_cards_by_ids(&card_ids).await?;

    let entries = owned
        .into_iter()
        .filter_map(|entry| {
            cards
                .iter()
                .find(|card| card.id == entry.card_id)
                .map(|card| CollectionEntry {
                    card: card.clone(),
                    quantity: entry.quantity,
                    obtained_at: entry.obtained_at,
                })
        })
        .collect();

    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn create_account_grants_starting_balances() {
        let app = Router::new()
            .route("/accounts", post(create_account))
            .with_state(AppStateBuilder::new().build());

        let request = Request::builder()
            .method("POST")
            .uri("/accounts")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"username": "player-one"}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let account: AccountModel = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(account.username, "player-one");
        assert_eq!(
            account.balance(crate::catalog::models::CurrencyType::Gold),
            10_000
        );
    }

    #[tokio::test]
    async fn create_account_rejects_blank_username() {
        let app = Router::new()
            .route("/accounts", post(create_account))
            .with_state(AppStateBuilder::new().build());

        let request = Request::builder()
            .method("POST")
            .uri("/accounts")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"username": "   "}"#))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
