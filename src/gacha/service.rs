use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::account::repository::{AccountRepository, CollectionRepository};
use crate::catalog::models::CardModel;
use crate::catalog::repository::CatalogRepository;
use crate::history::models::GachaRecordModel;
use crate::history::repository::HistoryRepository;
use crate::stats::cache::StatsCache;

use super::errors::GachaError;
use super::models::{GachaRequest, GachaResult};
use super::pity::{self, PityRepository};
use super::reconciler;
use super::resolver;
use super::validation;

/// Orchestrates one batch: validation, draw resolution, duplicate
/// reconciliation, currency debit and history append.
///
/// A batch is a single unit of work. Every fallible step runs before the
/// first write, so an aborted batch leaves no partial ledger, balance or
/// counter state behind. One invocation at a time per (account, pack) is
/// assumed; callers that interleave writers for the same pair must add
/// their own mutual exclusion around `perform_gacha`.
pub struct GachaService {
    catalog: Arc<dyn CatalogRepository + Send + Sync>,
    accounts: Arc<dyn AccountRepository + Send + Sync>,
    collection: Arc<dyn CollectionRepository + Send + Sync>,
    pity: Arc<dyn PityRepository + Send + Sync>,
    history: Arc<dyn HistoryRepository + Send + Sync>,
    stats_cache: Arc<StatsCache>,
}

impl GachaService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository + Send + Sync>,
        accounts: Arc<dyn AccountRepository + Send + Sync>,
        collection: Arc<dyn CollectionRepository + Send + Sync>,
        pity: Arc<dyn PityRepository + Send + Sync>,
        history: Arc<dyn HistoryRepository + Send + Sync>,
        stats_cache: Arc<StatsCache>,
    ) -> Self {
        Self {
            catalog,
            accounts,
            collection,
            pity,
            history,
            stats_cache,
        }
    }

    /// Resolves a batch with a fresh OS-seeded RNG.
    pub async fn perform_gacha(&self, request: GachaRequest) -> Result<GachaResult, GachaError> {
        self.perform_gacha_with_rng(request, StdRng::from_os_rng())
            .await
    }

    /// Resolves a batch with a caller-provided random source. Tests use
    /// this to pin draw outcomes.
    pub async fn perform_gacha_with_rng<R>(
        &self,
        request: GachaRequest,
        mut rng: R,
    ) -> Result<GachaResult, GachaError>
    where
        R: Rng + Send,
    {
        let quantity = request.quantity.count();

        let pack = self
            .catalog
            .get_pack(&request.pack_id)
            .await?
            .ok_or_else(|| GachaError::CardPackNotFound(request.pack_id.clone()))?;

        // Packs are validated on every write, but a batch against a stale
        // or hand-edited table must still fail before the first draw.
        validation::validate_pack(&pack)?;

        let mut account = self
            .accounts
            .get_account(&request.account_id)
            .await?
            .ok_or_else(|| GachaError::AccountNotFound(request.account_id.clone()))?;

        let total_cost = pack.batch_cost(quantity);
        let available = account.balance(pack.currency);
        if available < total_cost {
            return Err(GachaError::InsufficientCurrency {
                currency: pack.currency,
                required: total_cost,
                available,
            });
        }

        let cards_by_id: HashMap<String, CardModel> = self
            .catalog
            .get_cards_by_ids(&pack.available_cards)
            .await?
            .into_iter()
            .map(|card| (card.id.clone(), card))
            .collect();

        let mut counter = self
            .pity
            .get_counter(&request.account_id, &request.pack_id)
            .await?;

        // Resolve the whole batch before touching storage.
        let mut drawn = Vec::with_capacity(quantity as usize);
        let mut pity_triggered = false;
        for _ in 0..quantity {
            let outcome = resolver::draw_card(&pack, &cards_by_id, counter, &mut rng)?;
            pity_triggered |= outcome.pity_triggered;
            counter = pity::advance(counter, outcome.pity_triggered, pack.pity_system.as_ref());
            drawn.push(outcome.card);
        }

        // Settlement. From here on every step is a write.
        let now = Utc::now();
        let owned = self.collection.get_owned_cards(&request.account_id).await?;
        let reconciliation = reconciler::reconcile(&request.account_id, &drawn, &owned, now);

        self.pity
            .put_counter(&request.account_id, &request.pack_id, counter)
            .await?;

        for entry in &reconciliation.ledger {
            self.collection.put_owned_card(entry).await?;
        }

        let balance = account.currencies.entry(pack.currency).or_insert(0);
        *balance -= total_cost;

        account.statistics.total_gachas += u64::from(quantity);
        *account
            .statistics
            .total_spent
            .entry(pack.currency)
            .or_insert(0) += total_cost;
        for card in &drawn {
            *account
                .statistics
                .cards_by_rarity
                .entry(card.rarity)
                .or_insert(0) += 1;
            *account
                .statistics
                .gacha_by_rarity
                .entry(card.rarity)
                .or_insert(0) += 1;
        }
        account.statistics.last_gacha_at = Some(now);
        account.updated_at = now;
        self.accounts.put_account(&account).await?;

        let result = GachaResult {
            cards: drawn,
            new_cards: reconciliation.new_cards,
            duplicates: reconciliation.duplicates,
            currency_spent: total_cost,
            currency: pack.currency,
            pity_triggered,
            timestamp: now,
        };

        let record =
            GachaRecordModel::from_batch(&request.account_id, &pack, quantity, result.clone(), now);
        self.history.append(&record).await?;

        // The aggregates for this account (and the global rollup) are stale
        // now; the next read rebuilds them from the log.
        self.stats_cache.invalidate_account(&request.account_id).await;
        self.stats_cache.invalidate_global().await;

        info!(
            account_id = %request.account_id,
            pack_id = %request.pack_id,
            quantity,
            total_cost,
            pity_triggered,
            new_cards = result.new_cards.len(),
            "Gacha batch settled"
        );

        Ok(result)
    }
}
