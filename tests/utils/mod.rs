//! Shared helpers for the end-to-end workflow tests.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rand::RngCore;

use gachapon::catalog::models::{CardModel, CardPackModel, CardRarity, CurrencyType, PitySystem};
use gachapon::catalog::repository::CatalogRepository;
use gachapon::account::models::AccountModel;
use gachapon::account::repository::AccountRepository;
use gachapon::stats::StatsCache;
use gachapon::{
    GachaService, InMemoryAccountRepository, InMemoryCatalogRepository,
    InMemoryCollectionRepository, InMemoryHistoryRepository, InMemoryPityRepository, StatsService,
};

/// Everything a workflow test needs: the repositories and both services
/// wired over them, sharing one stats cache.
pub struct TestWorld {
    pub catalog: Arc<InMemoryCatalogRepository>,
    pub accounts: Arc<InMemoryAccountRepository>,
    pub collection: Arc<InMemoryCollectionRepository>,
    pub pity: Arc<InMemoryPityRepository>,
    pub history: Arc<InMemoryHistoryRepository>,
    pub gacha: GachaService,
    pub stats: StatsService,
}

impl TestWorld {
    pub fn new() -> Self {
        let catalog = Arc::new(InMemoryCatalogRepository::new());
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let collection = Arc::new(InMemoryCollectionRepository::new());
        let pity = Arc::new(InMemoryPityRepository::new());
        let history = Arc::new(InMemoryHistoryRepository::new());
        let stats_cache = Arc::new(StatsCache::new());

        let gacha = GachaService::new(
            catalog.clone(),
            accounts.clone(),
            collection.clone(),
            pity.clone(),
            history.clone(),
            stats_cache.clone(),
        );
        let stats = StatsService::new(
            catalog.clone(),
            accounts.clone(),
            history.clone(),
            stats_cache,
        );

        Self {
            catalog,
            accounts,
            collection,
            pity,
            history,
            gacha,
            stats,
        }
    }

    pub async fn seed_account(&self, gold: u64) -> AccountModel {
        let mut account = AccountModel::new("player".to_string());
        account.currencies.insert(CurrencyType::Gold, gold);
        self.accounts.create_account(&account).await.unwrap();
        account
    }

    pub async fn seed_card(&self, card: &CardModel) {
        self.catalog.upsert_card(card).await.unwrap();
    }

    pub async fn seed_pack(&self, pack: &CardPackModel) {
        self.catalog.upsert_pack(pack).await.unwrap();
    }
}

pub fn card(id: &str, rarity: CardRarity) -> CardModel {
    CardModel {
        id: id.to_string(),
        name: format!("Card {id}"),
        description: String::new(),
        rarity,
        image_url: String::new(),
        attributes: HashMap::new(),
        template_id: "tpl".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn pack(
    id: &str,
    cost: u64,
    entries: Vec<(&str, f64)>,
    pity_system: Option<PitySystem>,
) -> CardPackModel {
    CardPackModel {
        id: id.to_string(),
        name: format!("Pack {id}"),
        description: "An integration-test pack".to_string(),
        cover_image_url: "cover.png".to_string(),
        cost,
        currency: CurrencyType::Gold,
        is_active: true,
        available_cards: entries.iter().map(|(card_id, _)| card_id.to_string()).collect(),
        card_probabilities: entries
            .iter()
            .map(|(card_id, p)| (card_id.to_string(), *p))
            .collect(),
        pity_system,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn pity(max_pity: u32, soft_pity_start: u32, guaranteed: Vec<&str>) -> PitySystem {
    PitySystem {
        max_pity,
        soft_pity_start,
        guaranteed_cards: guaranteed.into_iter().map(str::to_string).collect(),
        guaranteed_card_weights: None,
        reset_on_trigger: true,
    }
}

/// RNG whose `random::<f64>()` always yields the same roll. The f64 sampler
/// takes the top 53 bits of `next_u64`, so `1 << 63` maps to exactly 0.5.
pub struct FixedRng(pub u64);

impl FixedRng {
    pub fn half() -> Self {
        FixedRng(1 << 63)
    }
}

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        (self.0 >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.0.to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
