use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

use super::models::{CardModel, CardPackModel, CardTemplateModel};
use crate::shared::AppError;

/// Trait for catalog storage: card definitions, pack definitions and card
/// templates. Writes are whole-record upserts, matching a document store.
#[async_trait]
pub trait CatalogRepository {
    async fn get_cards(&self) -> Result<Vec<CardModel>, AppError>;
    async fn get_card(&self, card_id: &str) -> Result<Option<CardModel>, AppError>;
    /// Resolves a batch of ids in request order; unknown ids are skipped.
    async fn get_cards_by_ids(&self, card_ids: &[String]) -> Result<Vec<CardModel>, AppError>;
    async fn upsert_card(&self, card: &CardModel) -> Result<(), AppError>;
    async fn delete_card(&self, card_id: &str) -> Result<(), AppError>;

    async fn get_packs(&self) -> Result<Vec<CardPackModel>, AppError>;
    async fn get_pack(&self, pack_id: &str) -> Result<Option<CardPackModel>, AppError>;
    async fn upsert_pack(&self, pack: &CardPackModel) -> Result<(), AppError>;
    async fn delete_pack(&self, pack_id: &str) -> Result<(), AppError>;

    async fn get_templates(&self) -> Result<Vec<CardTemplateModel>, AppError>;
    async fn get_template(&self, template_id: &str)
        -> Result<Option<CardTemplateModel>, AppError>;
    async fn upsert_template(&self, template: &CardTemplateModel) -> Result<(), AppError>;
}

/// In-memory implementation of CatalogRepository for development and testing
pub struct InMemoryCatalogRepository {
    cards: Mutex<HashMap<String, CardModel>>,
    packs: Mutex<HashMap<String, CardPackModel>>,
    templates: Mutex<HashMap<String, CardTemplateModel>>,
}

impl Default for InMemoryCatalogRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCatalogRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            cards: Mutex::new(HashMap::new()),
            packs: Mutex::new(HashMap::new()),
            templates: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository pre-populated with cards and packs
    pub fn with_catalog(cards: Vec<CardModel>, packs: Vec<CardPackModel>) -> Self {
        let repo = Self::new();
        {
            let mut card_map = repo.cards.lock().unwrap();
            for card in cards {
                card_map.insert(card.id.clone(), card);
            }
        }
        {
            let mut pack_map = repo.packs.lock().unwrap();
            for pack in packs {
                pack_map.insert(pack.id.clone(), pack);
            }
        }
        repo
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    #[instrument(skip(self))]
    async fn get_cards(&self) -> Result<Vec<CardModel>, AppError> {
        let cards = self.cards.lock().unwrap();
        let mut list: Vec<CardModel> = cards.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }

    #[instrument(skip(self))]
    async fn get_card(&self, card_id: &str) -> Result<Option<CardModel>, AppError> {
        let cards = self.cards.lock().unwrap();
        Ok(cards.get(card_id).cloned())
    }

    #[instrument(skip(self, card_ids))]
    async fn get_cards_by_ids(&self, card_ids: &[String]) -> Result<Vec<CardModel>, AppError> {
        let cards = self.cards.lock().unwrap();
        Ok(card_ids
            .iter()
            .filter_map(|id| cards.get(id).cloned())
            .collect())
    }

    #[instrument(skip(self, card))]
    async fn upsert_card(&self, card: &CardModel) -> Result<(), AppError> {
        debug!(card_id = %card.id, "Upserting card in memory");
        let mut cards = self.cards.lock().unwrap();
        cards.insert(card.id.clone(), card.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_card(&self, card_id: &str) -> Result<(), AppError> {
        debug!(card_id = %card_id, "Deleting card from memory");
        let mut cards = self.cards.lock().unwrap();
        cards.remove(card_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_packs(&self) -> Result<Vec<CardPackModel>, AppError> {
        let packs = self.packs.lock().unwrap();
        let mut list: Vec<CardPackModel> = packs.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }

    #[instrument(skip(self))]
    async fn get_pack(&self, pack_id: &str) -> Result<Option<CardPackModel>, AppError> {
        let packs = self.packs.lock().unwrap();
        let pack = packs.get(pack_id).cloned();
        match &pack {
            Some(_) => debug!(pack_id = %pack_id, "Pack found in memory"),
            None => debug!(pack_id = %pack_id, "Pack not found in memory"),
        }
        Ok(pack)
    }

    #[instrument(skip(self, pack))]
    async fn upsert_pack(&self, pack: &CardPackModel) -> Result<(), AppError> {
        debug!(pack_id = %pack.id, "Upserting pack in memory");
        let mut packs = self.packs.lock().unwrap();
        packs.insert(pack.id.clone(), pack.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_pack(&self, pack_id: &str) -> Result<(), AppError> {
        debug!(pack_id = %pack_id, "Deleting pack from memory");
        let mut packs = self.packs.lock().unwrap();
        packs.remove(pack_id);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_templates(&self) -> Result<Vec<CardTemplateModel>, AppError> {
        let templates = self.templates.lock().unwrap();
        let mut list: Vec<CardTemplateModel> = templates.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }

    #[instrument(skip(self))]
    async fn get_template(
        &self,
        template_id: &str,
    ) -> Result<Option<CardTemplateModel>, AppError> {
        let templates = self.templates.lock().unwrap();
        Ok(templates.get(template_id).cloned())
    }

    #[instrument(skip(self, template))]
    async fn upsert_template(&self, template: &CardTemplateModel) -> Result<(), AppError> {
        debug!(template_id = %template.id, "Upserting template in memory");
        let mut templates = self.templates.lock().unwrap();
        templates.insert(template.id.clone(), template.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::{CardRarity, CurrencyType};
    use chrono::Utc;

    fn test_card(id: &str) -> CardModel {
        CardModel {
            id: id.to_string(),
            name: format!("Card {id}"),
            description: String::new(),
            rarity: CardRarity::R,
            image_url: String::new(),
            attributes: HashMap::new(),
            template_id: "tpl".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_pack(id: &str) -> CardPackModel {
        CardPackModel {
            id: id.to_string(),
            name: format!("Pack {id}"),
            description: String::new(),
            cover_image_url: String::new(),
            cost: 100,
            currency: CurrencyType::Gold,
            is_active: true,
            available_cards: vec![],
            card_probabilities: HashMap::new(),
            pity_system: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn upsert_and_get_card() {
        let repo = InMemoryCatalogRepository::new();
        repo.upsert_card(&test_card("c1")).await.unwrap();

        let card = repo.get_card("c1").await.unwrap();
        assert!(card.is_some());
        assert_eq!(card.unwrap().name, "Card c1");
    }

    #[tokio::test]
    async fn get_cards_by_ids_preserves_request_order_and_skips_missing() {
        let repo = InMemoryCatalogRepository::new();
        repo.upsert_card(&test_card("a")).await.unwrap();
        repo.upsert_card(&test_card("b")).await.unwrap();

        let ids = vec!["b".to_string(), "missing".to_string(), "a".to_string()];
        let cards = repo.get_cards_by_ids(&ids).await.unwrap();

        let resolved: Vec<&str> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(resolved, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn delete_pack_removes_it() {
        let repo = InMemoryCatalogRepository::new();
        repo.upsert_pack(&test_pack("p1")).await.unwrap();
        repo.delete_pack("p1").await.unwrap();

        assert!(repo.get_pack("p1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_pack_overwrites_existing() {
        let repo = InMemoryCatalogRepository::new();
        let mut pack = test_pack("p1");
        repo.upsert_pack(&pack).await.unwrap();

        pack.cost = 250;
        repo.upsert_pack(&pack).await.unwrap();

        let stored = repo.get_pack("p1").await.unwrap().unwrap();
        assert_eq!(stored.cost, 250);
    }
}
