use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::account::models::OwnedCardModel;
use crate::catalog::models::CardModel;

use super::models::DuplicateGroup;

/// Classification of one batch against the account's existing collection,
/// plus the ledger writes the settlement step must apply.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub new_cards: Vec<CardModel>,
    pub duplicates: Vec<DuplicateGroup>,
    /// Owned-card entries to persist: updated quantities for duplicates,
    /// fresh entries for first-time cards.
    pub ledger: Vec<OwnedCardModel>,
}

/// Groups drawn cards by id and classifies each distinct id as new to the
/// account or a duplicate. Output order is the order ids were first seen in
/// the batch, not draw order. Pure function; the caller persists `ledger`.
pub fn reconcile(
    account_id: &str,
    drawn: &[CardModel],
    owned: &[OwnedCardModel],
    now: DateTime<Utc>,
) -> Reconciliation {
    let owned_by_card: HashMap<&str, &OwnedCardModel> = owned
        .iter()
        .map(|entry| (entry.card_id.as_str(), entry))
        .collect();

    let mut first_seen: Vec<&CardModel> = Vec::new();
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for card in drawn {
        if !counts.contains_key(card.id.as_str()) {
            first_seen.push(card);
        }
        *counts.entry(card.id.as_str()).or_insert(0) += 1;
    }

    let mut new_cards = Vec::new();
    let mut duplicates = Vec::new();
    let mut ledger = Vec::new();

    for card in first_seen {
        let count = counts[card.id.as_str()];

        match owned_by_card.get(card.id.as_str()) {
            Some(existing) => {
                duplicates.push(DuplicateGroup {
                    card: card.clone(),
                    count,
                });
                let mut updated = (*existing).clone();
                updated.quantity += count;
                ledger.push(updated);
            }
            None => {
                new_cards.push(card.clone());
                ledger.push(OwnedCardModel {
                    account_id: account_id.to_string(),
                    card_id: card.id.clone(),
                    quantity: count,
                    obtained_at: now,
                });
            }
        }
    }

    Reconciliation {
        new_cards,
        duplicates,
        ledger,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::CardRarity;
    use std::collections::HashMap as StdHashMap;

    fn card(id: &str) -> CardModel {
        CardModel {
            id: id.to_string(),
            name: format!("Card {id}"),
            description: String::new(),
            rarity: CardRarity::R,
            image_url: String::new(),
            attributes: StdHashMap::new(),
            template_id: "tpl".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn owned(account_id: &str, card_id: &str, quantity: u32) -> OwnedCardModel {
        OwnedCardModel {
            account_id: account_id.to_string(),
            card_id: card_id.to_string(),
            quantity,
            obtained_at: Utc::now(),
        }
    }

    #[test]
    fn repeated_unowned_card_is_one_new_entry_with_full_count() {
        let drawn = vec![card("a"), card("a")];
        let result = reconcile("acct", &drawn, &[], Utc::now());

        assert_eq!(result.new_cards.len(), 1);
        assert!(result.duplicates.is_empty());
        assert_eq!(result.ledger.len(), 1);
        assert_eq!(result.ledger[0].quantity, 2);
    }

    #[test]
    fn owned_card_is_classified_duplicate_and_quantity_grows() {
        let drawn = vec![card("a"), card("a"), card("b")];
        let existing = vec![owned("acct", "a", 3)];
        let result = reconcile("acct", &drawn, &existing, Utc::now());

        assert_eq!(result.new_cards.len(), 1);
        assert_eq!(result.new_cards[0].id, "b");
        assert_eq!(result.duplicates.len(), 1);
        assert_eq!(result.duplicates[0].card.id, "a");
        assert_eq!(result.duplicates[0].count, 2);

        let updated_a = result
            .ledger
            .iter()
            .find(|entry| entry.card_id == "a")
            .unwrap();
        assert_eq!(updated_a.quantity, 5);
    }

    #[test]
    fn output_order_is_first_seen_not_draw_order() {
        let drawn = vec![card("b"), card("a"), card("b"), card("c")];
        let result = reconcile("acct", &drawn, &[], Utc::now());

        let order: Vec<&str> = result.new_cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn empty_batch_yields_empty_reconciliation() {
        let result = reconcile("acct", &[], &[], Utc::now());
        assert!(result.new_cards.is_empty());
        assert!(result.duplicates.is_empty());
        assert!(result.ledger.is_empty());
    }
}
