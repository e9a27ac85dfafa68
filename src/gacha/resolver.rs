use std::collections::HashMap;

use rand::Rng;

use crate::catalog::models::{CardModel, CardPackModel, PitySystem};

use super::errors::GachaError;

/// Result of resolving a single draw.
#[derive(Debug, Clone)]
pub struct DrawOutcome {
    pub card: CardModel,
    pub pity_triggered: bool,
}

/// Resolves one draw against a pack.
///
/// With the pity counter at or past the hard threshold the draw is forced
/// into the guaranteed pool; otherwise it is a weighted roll over the pack's
/// probability table, biased toward the tail once the counter reaches the
/// soft-pity window. `cards_by_id` must hold the pack's resolvable cards —
/// the resolver itself never touches storage.
pub fn draw_card<R: Rng>(
    pack: &CardPackModel,
    cards_by_id: &HashMap<String, CardModel>,
    pity_counter: u32,
    rng: &mut R,
) -> Result<DrawOutcome, GachaError> {
    if let Some(pity) = &pack.pity_system {
        if pity_counter >= pity.max_pity {
            let card = guaranteed_card(pack, pity, cards_by_id, rng)?;
            return Ok(DrawOutcome {
                card,
                pity_triggered: true,
            });
        }
    }

    let card = weighted_card(pack, cards_by_id, pity_counter, rng)?;
    Ok(DrawOutcome {
        card,
        pity_triggered: false,
    })
}

/// The soft-pity roll multiplier input: grows linearly from 0 at the soft
/// start to 0.5 at max pity, capped at 0.5.
fn soft_pity_bonus(counter: u32, soft_start: u32, max_pity: u32) -> f64 {
    let progress = f64::from(counter - soft_start) / f64::from(max_pity - soft_start);
    (progress * 0.5).min(0.5)
}

fn weighted_card<R: Rng>(
    pack: &CardPackModel,
    cards_by_id: &HashMap<String, CardModel>,
    pity_counter: u32,
    rng: &mut R,
) -> Result<CardModel, GachaError> {
    let mut roll: f64 = rng.random();

    // Shrinking the roll walks it toward the front of the descending-sorted
    // table; the shape is load-bearing (observable drop rates), keep it.
    if let Some(pity) = &pack.pity_system {
        if pity_counter >= pity.soft_pity_start {
            roll *= 1.0 - soft_pity_bonus(pity_counter, pity.soft_pity_start, pity.max_pity);
        }
    }

    let mut entries: Vec<(&String, f64)> = pack
        .available_cards
        .iter()
        .filter_map(|card_id| {
            pack.card_probabilities
                .get(card_id)
                .map(|probability| (card_id, *probability))
        })
        .collect();
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut cumulative = 0.0;
    for (card_id, probability) in entries {
        cumulative += probability;
        if roll <= cumulative {
            // An id that no longer resolves to a card is skipped; the walk
            // keeps going and the next entry absorbs its share.
            if let Some(card) = cards_by_id.get(card_id) {
                return Ok(card.clone());
            }
        }
    }

    // Numerical edge: probabilities summing slightly under 1 can leave the
    // roll uncovered. Fall back to the first available card.
    pack.available_cards
        .first()
        .and_then(|card_id| cards_by_id.get(card_id))
        .cloned()
        .ok_or_else(|| GachaError::NoAvailableCards(pack.id.clone()))
}

fn guaranteed_card<R: Rng>(
    pack: &CardPackModel,
    pity: &PitySystem,
    cards_by_id: &HashMap<String, CardModel>,
    rng: &mut R,
) -> Result<CardModel, GachaError> {
    if pity.guaranteed_cards.is_empty() {
        return Err(GachaError::PitySystem(format!(
            "no guaranteed cards configured for pack {}",
            pack.id
        )));
    }

    let selected = match &pity.guaranteed_card_weights {
        Some(weights) if !weights.is_empty() => {
            let total: f64 = weights.iter().sum();
            let mut roll = rng.random::<f64>() * total;
            let mut selected = None;
            for (card_id, weight) in pity.guaranteed_cards.iter().zip(weights.iter()) {
                roll -= weight;
                if roll <= 0.0 {
                    selected = Some(card_id);
                    break;
                }
            }
            // Floating-point residue can leave the roll positive after the
            // last entry; it belongs to the last card.
            selected.or_else(|| pity.guaranteed_cards.last())
        }
        _ => {
            let index = rng.random_range(0..pity.guaranteed_cards.len());
            pity.guaranteed_cards.get(index)
        }
    };

    let card_id = selected.ok_or_else(|| {
        GachaError::PitySystem(format!("no guaranteed cards configured for pack {}", pack.id))
    })?;

    cards_by_id.get(card_id).cloned().ok_or_else(|| {
        GachaError::PitySystem(format!(
            "guaranteed card {card_id} of pack {} does not resolve to a card",
            pack.id
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::models::{CardRarity, CurrencyType};
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    /// RNG whose `random::<f64>()` always yields the same value. The f64
    /// sampler takes the top 53 bits of `next_u64`, so a constant word maps
    /// to a constant roll; `1 << 63` maps to exactly 0.5.
    struct FixedRng(u64);

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

    fn half_roll() -> FixedRng {
        FixedRng(1 << 63)
    }

    fn card(id: &str, rarity: CardRarity) -> CardModel {
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

    fn pack(entries: Vec<(&str, f64)>, pity_system: Option<PitySystem>) -> CardPackModel {
        CardPackModel {
            id: "pack-1".to_string(),
            name: "Test Pack".to_string(),
            description: String::new(),
            cover_image_url: String::new(),
            cost: 100,
            currency: CurrencyType::Gold,
            is_active: true,
            available_cards: entries.iter().map(|(id, _)| id.to_string()).collect(),
            card_probabilities: entries
                .iter()
                .map(|(id, p)| (id.to_string(), *p))
                .collect(),
            pity_system,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn cards_by_id(cards: Vec<CardModel>) -> HashMap<String, CardModel> {
        cards.into_iter().map(|c| (c.id.clone(), c)).collect()
    }

    fn pity(guaranteed: Vec<&str>) -> PitySystem {
        PitySystem {
            max_pity: 10,
            soft_pity_start: 8,
            guaranteed_cards: guaranteed.into_iter().map(str::to_string).collect(),
            guaranteed_card_weights: None,
            reset_on_trigger: true,
        }
    }

    #[test]
    fn half_roll_resolves_to_highest_probability_card() {
        // Cumulative after descending sort: a -> 0.6, which covers r = 0.5.
        let pack = pack(vec![("a", 0.6), ("b", 0.4)], None);
        let cards = cards_by_id(vec![card("a", CardRarity::N), card("b", CardRarity::SSR)]);

        let outcome = draw_card(&pack, &cards, 0, &mut half_roll()).unwrap();
        assert_eq!(outcome.card.id, "a");
        assert!(!outcome.pity_triggered);
    }

    #[test]
    fn hard_pity_forces_guaranteed_card() {
        let pack = pack(
            vec![("a", 1.0), ("c", 0.0)],
            Some(pity(vec!["c"])),
        );
        let cards = cards_by_id(vec![card("a", CardRarity::N), card("c", CardRarity::SSR)]);

        let outcome = draw_card(&pack, &cards, 10, &mut half_roll()).unwrap();
        assert_eq!(outcome.card.id, "c");
        assert!(outcome.pity_triggered);
    }

    #[test]
    fn hard_pity_with_empty_pool_is_a_configuration_error() {
        let pack = pack(vec![("a", 1.0)], Some(pity(vec![])));
        let cards = cards_by_id(vec![card("a", CardRarity::N)]);

        let result = draw_card(&pack, &cards, 10, &mut half_roll());
        assert!(matches!(result, Err(GachaError::PitySystem(_))));
    }

    #[test]
    fn soft_pity_shrinks_the_roll_per_documented_formula() {
        // r = 0.7 lands on b normally (cumulative a -> 0.6, b -> 1.0). At
        // counter 9 of soft 8 / max 10 the bonus is min(0.5, 0.5 * 1/2)
        // = 0.25, so the roll becomes 0.525 and lands on a instead.
        const ROLL_70: u64 = (u64::MAX / 10) * 7; // top 53 bits ≈ 0.7
        let roll: f64 = FixedRng(ROLL_70).random();
        assert!((roll - 0.7).abs() < 1e-9);

        let no_pity = pack(vec![("a", 0.6), ("b", 0.4)], None);
        let cards = cards_by_id(vec![card("a", CardRarity::N), card("b", CardRarity::SSR)]);
        let outcome = draw_card(&no_pity, &cards, 9, &mut FixedRng(ROLL_70)).unwrap();
        assert_eq!(outcome.card.id, "b");

        let with_pity = pack(vec![("a", 0.6), ("b", 0.4)], Some(pity(vec!["b"])));
        let outcome = draw_card(&with_pity, &cards, 9, &mut FixedRng(ROLL_70)).unwrap();
        assert_eq!(outcome.card.id, "a");
    }

    #[test]
    fn soft_pity_bonus_is_capped_at_half() {
        assert_eq!(soft_pity_bonus(8, 8, 10), 0.0);
        assert_eq!(soft_pity_bonus(9, 8, 10), 0.25);
        assert_eq!(soft_pity_bonus(10, 8, 10), 0.5);
        assert_eq!(soft_pity_bonus(50, 8, 10), 0.5);
    }

    #[test]
    fn unresolvable_winner_is_skipped_in_the_walk() {
        // "ghost" wins the roll but has no card definition; the walk moves
        // on and "b" absorbs it.
        let pack = pack(vec![("ghost", 0.6), ("b", 0.4)], None);
        let cards = cards_by_id(vec![card("b", CardRarity::R)]);

        let outcome = draw_card(&pack, &cards, 0, &mut half_roll()).unwrap();
        assert_eq!(outcome.card.id, "b");
    }

    #[test]
    fn empty_pack_fails_with_no_available_cards() {
        let pack = pack(vec![], None);
        let cards = HashMap::new();

        let result = draw_card(&pack, &cards, 0, &mut half_roll());
        assert!(matches!(result, Err(GachaError::NoAvailableCards(_))));
    }

    #[test]
    fn guaranteed_weights_skew_the_pick() {
        let mut system = pity(vec!["c1", "c2"]);
        system.guaranteed_card_weights = Some(vec![1.0, 99.0]);
        let pack = pack(vec![("c1", 0.5), ("c2", 0.5)], Some(system));
        let cards = cards_by_id(vec![card("c1", CardRarity::UR), card("c2", CardRarity::UR)]);

        let mut rng = StdRng::seed_from_u64(7);
        let mut c2_hits = 0;
        for _ in 0..200 {
            let outcome = draw_card(&pack, &cards, 10, &mut rng).unwrap();
            assert!(outcome.pity_triggered);
            if outcome.card.id == "c2" {
                c2_hits += 1;
            }
        }
        // With a 99:1 weight ratio nearly every pick is c2.
        assert!(c2_hits > 180, "c2 picked only {c2_hits} of 200 times");
    }

    #[test]
    fn uniform_guaranteed_choice_reaches_every_card() {
        let pack = pack(
            vec![("c1", 0.5), ("c2", 0.5)],
            Some(pity(vec!["c1", "c2"])),
        );
        let cards = cards_by_id(vec![card("c1", CardRarity::UR), card("c2", CardRarity::UR)]);

        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let outcome = draw_card(&pack, &cards, 10, &mut rng).unwrap();
            seen.insert(outcome.card.id);
        }
        assert_eq!(seen.len(), 2);
    }
}
