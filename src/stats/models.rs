use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::catalog::models::{CardRarity, CurrencyType};

/// Cross-account statistics, derived by scanning every account's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStatistics {
    pub total_accounts: u64,
    pub total_gachas: u64,
    pub total_revenue: HashMap<CurrencyType, u64>,
    pub card_distribution: HashMap<CardRarity, u64>,
    /// Top five packs by total draws, descending.
    pub popular_packs: Vec<PopularPack>,
    pub active_accounts: ActivityWindows,
}

impl GlobalStatistics {
    pub fn zeroed() -> Self {
        Self {
            total_accounts: 0,
            total_gachas: 0,
            total_revenue: CurrencyType::iter().map(|c| (c, 0)).collect(),
            card_distribution: CardRarity::iter().map(|r| (r, 0)).collect(),
            popular_packs: Vec::new(),
            active_accounts: ActivityWindows::default(),
        }
    }
}

/// One entry of the popular-packs ranking. The name comes from the current
/// catalog when the pack still exists, "Unknown" otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularPack {
    pub pack_id: String,
    pub name: String,
    pub draws: u64,
}

/// Accounts with at least one draw inside each recency window, measured
/// against "now" at aggregation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityWindows {
    pub daily: u64,
    pub weekly: u64,
    pub monthly: u64,
}
