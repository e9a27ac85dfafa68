use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::account::models::UserStatistics;

use super::models::GlobalStatistics;

/// Read-through cache for aggregated statistics with typed slots and
/// explicit invalidation. Every settled batch invalidates the drawing
/// account's slot and the global slot; a cached value is only ever replaced
/// by a full replay, never incremented in place, so the cached and replayed
/// paths cannot diverge.
#[derive(Default)]
pub struct StatsCache {
    global: RwLock<Option<GlobalStatistics>>,
    accounts: RwLock<HashMap<String, UserStatistics>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn global(&self) -> Option<GlobalStatistics> {
        self.global.read().await.clone()
    }

    pub async fn store_global(&self, statistics: GlobalStatistics) {
        *self.global.write().await = Some(statistics);
    }

    pub async fn invalidate_global(&self) {
        *self.global.write().await = None;
    }

    pub async fn account(&self, account_id: &str) -> Option<UserStatistics> {
        self.accounts.read().await.get(account_id).cloned()
    }

    pub async fn store_account(&self, account_id: &str, statistics: UserStatistics) {
        self.accounts
            .write()
            .await
            .insert(account_id.to_string(), statistics);
    }

    pub async fn invalidate_account(&self, account_id: &str) {
        self.accounts.write().await.remove(account_id);
    }
}
