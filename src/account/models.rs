use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use uuid::Uuid;

use crate::catalog::models::{CardRarity, CurrencyType};

/// Aggregate draw statistics for one account.
///
/// This is a cache: the source of truth is the account's history log, and
/// the whole struct is rebuilt by replay. Nothing in here may be trusted
/// over a fresh rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub total_gachas: u64,
    pub total_spent: HashMap<CurrencyType, u64>,
    pub cards_by_rarity: HashMap<CardRarity, u64>,
    pub gacha_by_rarity: HashMap<CardRarity, u64>,
    /// Per-pack rollup carrying the denormalized pack metadata from the
    /// most recent record for that pack, newest activity first.
    pub pack_summaries: Vec<PackGachaSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_gacha_at: Option<DateTime<Utc>>,
}

impl UserStatistics {
    /// All counters present and zero, so serialized output always lists
    /// every rarity and currency.
    pub fn zeroed() -> Self {
        Self {
            total_gachas: 0,
            total_spent: CurrencyType::iter().map(|c| (c, 0)).collect(),
            cards_by_rarity: CardRarity::iter().map(|r| (r, 0)).collect(),
            gacha_by_rarity: CardRarity::iter().map(|r| (r, 0)).collect(),
            pack_summaries: Vec::new(),
            last_gacha_at: None,
        }
    }
}

impl Default for UserStatistics {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Per-pack slice of an account's statistics. Pack metadata is denormalized
/// from history records, so the summary still renders after the pack itself
/// is edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackGachaSummary {
    pub pack_id: String,
    pub pack_name: String,
    pub pack_description: String,
    pub pack_cover_image_url: String,
    pub currency: CurrencyType,
    pub cost: u64,
    pub total_gachas: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_gacha_at: Option<DateTime<Utc>>,
}

/// An account: currency balances plus the statistics cache. Balances are
/// unsigned, so a negative balance is unrepresentable; the orchestrator
/// checks affordability before debiting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountModel {
    pub id: String,
    pub username: String,
    pub currencies: HashMap<CurrencyType, u64>,
    pub statistics: UserStatistics,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountModel {
    /// Creates a fresh account with the standard starting grant.
    pub fn new(username: String) -> Self {
        let now = Utc::now();
        let mut currencies = HashMap::new();
        currencies.insert(CurrencyType::Gold, 10_000);
        currencies.insert(CurrencyType::Ticket, 10);
        currencies.insert(CurrencyType::Premium, 0);

        Self {
            id: Uuid::new_v4().to_string(),
            username,
            currencies,
            statistics: UserStatistics::zeroed(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Current balance in the given currency; missing entries read as zero.
    pub fn balance(&self, currency: CurrencyType) -> u64 {
        self.currencies.get(&currency).copied().unwrap_or(0)
    }
}

/// One (account, card) entry in the owned-card ledger. Created on first
/// draw, incremented on every later draw of the same card, never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedCardModel {
    pub account_id: String,
    pub card_id: String,
    pub quantity: u32,
    pub obtained_at: DateTime<Utc>,
}
