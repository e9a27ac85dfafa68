use thiserror::Error;

use crate::catalog::models::CurrencyType;
use crate::shared::AppError;

/// Error kinds of the draw-resolution pipeline. All of them abort the
/// current batch before any currency debit or history append.
///
/// `InvalidProbability`, `PitySystem` and `NoAvailableCards` indicate a
/// data-authoring defect and belong in front of an operator;
/// `CardPackNotFound`, `AccountNotFound` and `InsufficientCurrency` are
/// legitimate user-facing conditions.
#[derive(Debug, Error)]
pub enum GachaError {
    #[error("invalid probability configuration: {0}")]
    InvalidProbability(String),

    #[error("pity system misconfigured: {0}")]
    PitySystem(String),

    #[error("card pack {0} not found")]
    CardPackNotFound(String),

    #[error("account {0} not found")]
    AccountNotFound(String),

    #[error("insufficient {currency}: required {required}, available {available}")]
    InsufficientCurrency {
        currency: CurrencyType,
        required: u64,
        available: u64,
    },

    #[error("no available cards in pack {0}")]
    NoAvailableCards(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<AppError> for GachaError {
    fn from(err: AppError) -> Self {
        GachaError::Storage(err.to_string())
    }
}
