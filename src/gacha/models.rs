use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::models::{CardModel, CurrencyType};

/// Number of draws in one batch. Only single and ten-draw batches exist, so
/// an out-of-range quantity is rejected at deserialization and cannot reach
/// the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum DrawCount {
    Single,
    Ten,
}

impl DrawCount {
    pub fn count(self) -> u32 {
        match self {
            DrawCount::Single => 1,
            DrawCount::Ten => 10,
        }
    }
}

impl TryFrom<u32> for DrawCount {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DrawCount::Single),
            10 => Ok(DrawCount::Ten),
            other => Err(format!("draw quantity must be 1 or 10, got {other}")),
        }
    }
}

impl From<DrawCount> for u32 {
    fn from(value: DrawCount) -> Self {
        value.count()
    }
}

/// One user-initiated batch request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GachaRequest {
    pub account_id: String,
    pub pack_id: String,
    pub quantity: DrawCount,
}

/// A drawn card grouped with how many copies of it this batch produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub card: CardModel,
    pub count: u32,
}

/// The outcome of one resolved batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GachaResult {
    /// Every drawn card in draw order.
    pub cards: Vec<CardModel>,
    /// Cards the account did not own before this batch, in the order their
    /// ids were first seen within the batch.
    pub new_cards: Vec<CardModel>,
    /// Cards the account already owned, grouped with in-batch counts, in
    /// first-seen order.
    pub duplicates: Vec<DuplicateGroup>,
    pub currency_spent: u64,
    pub currency: CurrencyType,
    /// True if any draw in the batch was forced by hard pity.
    pub pity_triggered: bool,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, true)]
    #[case(10, true)]
    #[case(0, false)]
    #[case(2, false)]
    #[case(11, false)]
    fn draw_count_accepts_only_one_or_ten(#[case] value: u32, #[case] accepted: bool) {
        let parsed: Result<DrawCount, _> = serde_json::from_str(&value.to_string());
        assert_eq!(parsed.is_ok(), accepted);
    }

    #[test]
    fn draw_count_serializes_back_to_number() {
        let json = serde_json::to_string(&DrawCount::Ten).unwrap();
        assert_eq!(json, "10");
    }
}
