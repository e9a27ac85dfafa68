use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::models::{CardPackModel, CurrencyType};
use crate::gacha::models::GachaResult;

/// One resolved batch in the append-only history log.
///
/// Pack name, description, cover, currency and cost are denormalized at
/// write time so replay never depends on the pack still existing or being
/// unchanged. Records are immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GachaRecordModel {
    pub id: String,
    pub account_id: String,
    pub pack_id: String,
    pub pack_name: String,
    pub pack_description: String,
    pub pack_cover_image_url: String,
    pub pack_currency: CurrencyType,
    pub pack_cost: u64,
    pub quantity: u32,
    pub result: GachaResult,
    pub created_at: DateTime<Utc>,
}

impl GachaRecordModel {
    /// Builds a record for a settled batch, snapshotting the pack's current
    /// metadata.
    pub fn from_batch(
        account_id: &str,
        pack: &CardPackModel,
        quantity: u32,
        result: GachaResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            pack_id: pack.id.clone(),
            pack_name: pack.name.clone(),
            pack_description: pack.description.clone(),
            pack_cover_image_url: pack.cover_image_url.clone(),
            pack_currency: pack.currency,
            pack_cost: pack.cost,
            quantity,
            result,
            created_at,
        }
    }
}
