use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument};

use crate::catalog::models::PitySystem;
use crate::shared::AppError;

/// Computes the counter value after one draw.
///
/// A triggering draw resets the counter to zero when the pack asks for it
/// (`reset_on_trigger`), otherwise the counter keeps climbing. Every
/// non-triggering draw increments by one, including draws against packs
/// without a pity system, so the counter is already warm if pity is added
/// to a pack later.
pub fn advance(counter: u32, triggered: bool, pity: Option<&PitySystem>) -> u32 {
    if triggered {
        match pity {
            Some(system) if system.reset_on_trigger => 0,
            _ => counter + 1,
        }
    } else {
        counter + 1
    }
}

/// Trait for pity counter storage, keyed by (account, pack). Counters
/// persist across batches; a missing entry reads as zero.
#[async_trait]
pub trait PityRepository {
    async fn get_counter(&self, account_id: &str, pack_id: &str) -> Result<u32, AppError>;
    async fn put_counter(
        &self,
        account_id: &str,
        pack_id: &str,
        counter: u32,
    ) -> Result<(), AppError>;
}

/// In-memory implementation of PityRepository for development and testing
pub struct InMemoryPityRepository {
    counters: Mutex<HashMap<(String, String), u32>>,
}

impl Default for InMemoryPityRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPityRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl PityRepository for InMemoryPityRepository {
    #[instrument(skip(self))]
    async fn get_counter(&self, account_id: &str, pack_id: &str) -> Result<u32, AppError> {
        let counters = self.counters.lock().unwrap();
        let counter = counters
            .get(&(account_id.to_string(), pack_id.to_string()))
            .copied()
            .unwrap_or(0);
        Ok(counter)
    }

    #[instrument(skip(self))]
    async fn put_counter(
        &self,
        account_id: &str,
        pack_id: &str,
        counter: u32,
    ) -> Result<(), AppError> {
        debug!(account_id = %account_id, pack_id = %pack_id, counter, "Persisting pity counter");
        let mut counters = self.counters.lock().unwrap();
        counters.insert((account_id.to_string(), pack_id.to_string()), counter);
        Ok(())
    }
}
