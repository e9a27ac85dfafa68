use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::schema::{AttributeKind, AttributeValue};

/// Card rarity tiers, ordered from most common to rarest.
/// The derived `Ord` follows declaration order: N < R < SR < SSR < UR < LR.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum CardRarity {
    N,
    R,
    SR,
    SSR,
    UR,
    LR,
}

/// Currency kinds a pack can charge in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum CurrencyType {
    Gold,
    Ticket,
    Premium,
}

/// A card definition. History records store full snapshots of these, so a
/// card that has been drawn at least once is effectively immutable from the
/// log's point of view even if the catalog entry is later edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardModel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rarity: CardRarity,
    pub image_url: String,
    /// Schema-validated attribute bag, checked against the card's template
    /// on every write.
    pub attributes: HashMap<String, AttributeValue>,
    pub template_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Declares the attribute schema cards of this template must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardTemplateModel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub schema: HashMap<String, AttributeKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pity (guaranteed-draw) configuration for a pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitySystem {
    /// Hard pity threshold: a draw with counter >= max_pity is forced.
    pub max_pity: u32,
    /// Counter value at which the soft-pity roll bias starts. Must be
    /// strictly below `max_pity`.
    pub soft_pity_start: u32,
    /// Pool a forced draw selects from. Every id must be in the pack's
    /// `available_cards`.
    pub guaranteed_cards: Vec<String>,
    /// Optional weights for the guaranteed pool, same length as
    /// `guaranteed_cards`, all positive. Absent means uniform choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guaranteed_card_weights: Option<Vec<f64>>,
    /// Whether a forced draw resets the counter to zero.
    pub reset_on_trigger: bool,
}

/// A purchasable pack: a priced, weighted draw table over card ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardPackModel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cover_image_url: String,
    pub cost: u64,
    pub currency: CurrencyType,
    /// Inactive packs are hidden from the public listing but stay
    /// resolvable by id; deactivation is not deletion.
    pub is_active: bool,
    pub available_cards: Vec<String>,
    /// Per-card draw probability. Must cover every id in `available_cards`
    /// and sum to 1.0 within tolerance.
    pub card_probabilities: HashMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pity_system: Option<PitySystem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CardPackModel {
    /// Total cost of a batch of `quantity` draws.
    pub fn batch_cost(&self, quantity: u32) -> u64 {
        self.cost * u64::from(quantity)
    }
}
