use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use crate::account::models::{PackGachaSummary, UserStatistics};
use crate::account::repository::AccountRepository;
use crate::catalog::repository::CatalogRepository;
use crate::gacha::GachaError;
use crate::history::models::GachaRecordModel;
use crate::history::repository::HistoryRepository;

use super::cache::StatsCache;
use super::models::{ActivityWindows, GlobalStatistics, PopularPack};

/// Rebuilds statistics by replaying the history log. The log is the source
/// of truth; the per-account statistics cache and the in-process
/// [`StatsCache`] are both derived from it and always overwritten whole.
pub struct StatsService {
    catalog: Arc<dyn CatalogRepository + Send + Sync>,
    accounts: Arc<dyn AccountRepository + Send + Sync>,
    history: Arc<dyn HistoryRepository + Send + Sync>,
    cache: Arc<StatsCache>,
}

impl StatsService {
    pub fn new(
        catalog: Arc<dyn CatalogRepository + Send + Sync>,
        accounts: Arc<dyn AccountRepository + Send + Sync>,
        history: Arc<dyn HistoryRepository + Send + Sync>,
        cache: Arc<StatsCache>,
    ) -> Self {
        Self {
            catalog,
            accounts,
            history,
            cache,
        }
    }

    /// Read-through account statistics: serves the cached copy when one
    /// exists, otherwise rebuilds by replay and caches the result.
    pub async fn account_statistics(
        &self,
        account_id: &str,
    ) -> Result<UserStatistics, GachaError> {
        if let Some(cached) = self.cache.account(account_id).await {
            debug!(account_id = %account_id, "Serving account statistics from cache");
            return Ok(cached);
        }

        let statistics = self.rebuild_account_statistics(account_id).await?;
        self.cache
            .store_account(account_id, statistics.clone())
            .await;
        Ok(statistics)
    }

    /// Zeroes every counter and replays the account's full history in
    /// creation order, then overwrites the account's embedded statistics
    /// cache. Idempotent: two consecutive rebuilds over the same log yield
    /// identical statistics.
    pub async fn rebuild_account_statistics(
        &self,
        account_id: &str,
    ) -> Result<UserStatistics, GachaError> {
        let mut account = self
            .accounts
            .get_account(account_id)
            .await?
            .ok_or_else(|| GachaError::AccountNotFound(account_id.to_string()))?;

        let mut records = self.history.get_for_account(account_id).await?;
        // The log reads newest-first; replay wants creation order.
        records.reverse();

        let statistics = replay(&records);

        account.statistics = statistics.clone();
        account.updated_at = Utc::now();
        self.accounts.put_account(&account).await?;

        info!(
            account_id = %account_id,
            records = records.len(),
            total_gachas = statistics.total_gachas,
            "Rebuilt account statistics from history"
        );

        Ok(statistics)
    }

    /// Global statistics across every account's log, read-through cached.
    pub async fn global_statistics(&self) -> Result<GlobalStatistics, GachaError> {
        if let Some(cached) = self.cache.global().await {
            debug!("Serving global statistics from cache");
            return Ok(cached);
        }

        let accounts = self.accounts.list_accounts().await?;
        let records = self.history.get_all().await?;
        let packs = self.catalog.get_packs().await?;

        let mut statistics = GlobalStatistics::zeroed();
        statistics.total_accounts = accounts.len() as u64;

        let mut draws_per_pack: HashMap<String, u64> = HashMap::new();
        for record in &records {
            statistics.total_gachas += u64::from(record.quantity);
            *statistics
                .total_revenue
                .entry(record.result.currency)
                .or_insert(0) += record.result.currency_spent;
            for card in &record.result.cards {
                *statistics
                    .card_distribution
                    .entry(card.rarity)
                    .or_insert(0) += 1;
            }
            *draws_per_pack.entry(record.pack_id.clone()).or_insert(0) +=
                u64::from(record.quantity);
        }

        let mut popular: Vec<PopularPack> = draws_per_pack
            .into_iter()
            .map(|(pack_id, draws)| PopularPack {
                name: packs
                    .iter()
                    .find(|pack| pack.id == pack_id)
                    .map(|pack| pack.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                pack_id,
                draws,
            })
            .collect();
        popular.sort_by(|a, b| b.draws.cmp(&a.draws).then_with(|| a.pack_id.cmp(&b.pack_id)));
        popular.truncate(5);
        statistics.popular_packs = popular;

        let now = Utc::now();
        let mut windows = ActivityWindows::default();
        for account in &accounts {
            let Some(last) = account.statistics.last_gacha_at else {
                continue;
            };
            if last > now - Duration::hours(24) {
                windows.daily += 1;
            }
            if last > now - Duration::days(7) {
                windows.weekly += 1;
            }
            if last > now - Duration::days(30) {
                windows.monthly += 1;
            }
        }
        statistics.active_accounts = windows;

        self.cache.store_global(statistics.clone()).await;
        Ok(statistics)
    }
}

/// Pure replay of one account's records, oldest first.
fn replay(records: &[GachaRecordModel]) -> UserStatistics {
    let mut statistics = UserStatistics::zeroed();
    let mut summaries: Vec<PackGachaSummary> = Vec::new();

    for record in records {
        statistics.total_gachas += u64::from(record.quantity);
        *statistics
            .total_spent
            .entry(record.pack_currency)
            .or_insert(0) += record.result.currency_spent;

        for card in &record.result.cards {
            *statistics.cards_by_rarity.entry(card.rarity).or_insert(0) += 1;
            *statistics.gacha_by_rarity.entry(card.rarity).or_insert(0) += 1;
        }

        match summaries
            .iter_mut()
            .find(|summary| summary.pack_id == record.pack_id)
        {
            Some(summary) => {
                summary.total_gachas += u64::from(record.quantity);
                // Later records win the denormalized metadata, so the
                // summary shows the pack as it was last drawn from.
                summary.pack_name = record.pack_name.clone();
                summary.pack_description = record.pack_description.clone();
                summary.pack_cover_image_url = record.pack_cover_image_url.clone();
                summary.currency = record.pack_currency;
                summary.cost = record.pack_cost;
                if summary.last_gacha_at.map_or(true, |t| record.created_at > t) {
                    summary.last_gacha_at = Some(record.created_at);
                }
            }
            None => summaries.push(PackGachaSummary {
                pack_id: record.pack_id.clone(),
                pack_name: record.pack_name.clone(),
                pack_description: record.pack_description.clone(),
                pack_cover_image_url: record.pack_cover_image_url.clone(),
                currency: record.pack_currency,
                cost: record.pack_cost,
                total_gachas: u64::from(record.quantity),
                last_gacha_at: Some(record.created_at),
            }),
        }

        if statistics
            .last_gacha_at
            .map_or(true, |t| record.created_at > t)
        {
            statistics.last_gacha_at = Some(record.created_at);
        }
    }

    summaries.sort_by(|a, b| b.last_gacha_at.cmp(&a.last_gacha_at));
    statistics.pack_summaries = summaries;
    statistics
}
