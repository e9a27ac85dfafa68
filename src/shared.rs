use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::account::repository::{AccountRepository, CollectionRepository};
use crate::catalog::repository::CatalogRepository;
use crate::gacha::GachaError;
use crate::gacha::pity::PityRepository;
use crate::history::repository::HistoryRepository;
use crate::stats::cache::StatsCache;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub catalog_repository: Arc<dyn CatalogRepository + Send + Sync>,
    pub account_repository: Arc<dyn AccountRepository + Send + Sync>,
    pub collection_repository: Arc<dyn CollectionRepository + Send + Sync>,
    pub pity_repository: Arc<dyn PityRepository + Send + Sync>,
    pub history_repository: Arc<dyn HistoryRepository + Send + Sync>,
    pub stats_cache: Arc<StatsCache>,
}

impl AppState {
    pub fn new(
        catalog_repository: Arc<dyn CatalogRepository + Send + Sync>,
        account_repository: Arc<dyn AccountRepository + Send + Sync>,
        collection_repository: Arc<dyn CollectionRepository + Send + Sync>,
        pity_repository: Arc<dyn PityRepository + Send + Sync>,
        history_repository: Arc<dyn HistoryRepository + Send + Sync>,
    ) -> Self {
        Self {
            catalog_repository,
            account_repository,
            collection_repository,
            pity_repository,
            history_repository,
            stats_cache: Arc::new(StatsCache::new()),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Data-authoring defects (bad probability tables, broken pity pools).
    /// Surfaced to operators through logs, never echoed to players.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl From<GachaError> for AppError {
    fn from(err: GachaError) -> Self {
        match err {
            GachaError::CardPackNotFound(_) | GachaError::AccountNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            GachaError::InsufficientCurrency { .. } => AppError::BadRequest(err.to_string()),
            GachaError::InvalidProbability(_)
            | GachaError::PitySystem(_)
            | GachaError::NoAvailableCards(_) => AppError::Configuration(err.to_string()),
            GachaError::Storage(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Configuration(msg) => {
                tracing::error!(error = %msg, "Data authoring error surfaced to a request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal configuration error".to_string(),
                )
            }
            AppError::DatabaseError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {}", msg),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
