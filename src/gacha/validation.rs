use crate::catalog::models::CardPackModel;

use super::errors::GachaError;

/// Allowed deviation of a pack's probability sum from 1.0.
pub const PROBABILITY_TOLERANCE: f64 = 0.001;

/// Validates a pack's draw table and pity configuration. Runs on pack
/// creation/update and again defensively before every batch, so a
/// misconfigured pack is rejected before any draw is attempted.
pub fn validate_pack(pack: &CardPackModel) -> Result<(), GachaError> {
    validate_probabilities(pack)?;
    validate_pity_system(pack)?;
    Ok(())
}

fn validate_probabilities(pack: &CardPackModel) -> Result<(), GachaError> {
    let mut total = 0.0;

    for card_id in &pack.available_cards {
        let probability = pack.card_probabilities.get(card_id).ok_or_else(|| {
            GachaError::InvalidProbability(format!(
                "card {card_id} is available in pack {} but has no probability entry",
                pack.id
            ))
        })?;

        if !(0.0..=1.0).contains(probability) {
            return Err(GachaError::InvalidProbability(format!(
                "probability {probability} for card {card_id} is outside [0, 1]"
            )));
        }

        total += probability;
    }

    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(GachaError::InvalidProbability(format!(
            "probabilities in pack {} sum to {total:.4}, expected 1.0",
            pack.id
        )));
    }

    Ok(())
}

fn validate_pity_system(pack: &CardPackModel) -> Result<(), GachaError> {
    let Some(pity) = &pack.pity_system else {
        return Ok(());
    };

    if pity.soft_pity_start >= pity.max_pity {
        return Err(GachaError::PitySystem(format!(
            "soft pity start {} must be below max pity {} in pack {}",
            pity.soft_pity_start, pity.max_pity, pack.id
        )));
    }

    for card_id in &pity.guaranteed_cards {
        if !pack.available_cards.contains(card_id) {
            return Err(GachaError::PitySystem(format!(
                "guaranteed card {card_id} is not among the available cards of pack {}",
                pack.id
            )));
        }
    }

    if let Some(weights) = &pity.guaranteed_card_weights {
        if weights.len() != pity.guaranteed_cards.len() {
            return Err(GachaError::PitySystem(format!(
                "pack {} declares {} guaranteed cards but {} weights",
                pack.id,
                pity.guaranteed_cards.len(),
                weights.len()
            )));
        }

        for (card_id, weight) in pity.guaranteed_cards.iter().zip(weights.iter()) {
            if *weight <= 0.0 {
                return Err(GachaError::PitySystem(format!(
                    "weight {weight} for guaranteed card {card_id} must be positive"
                )));
            }
        }
    }

    Ok(())
}
