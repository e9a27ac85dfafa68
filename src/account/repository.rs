use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{AccountModel, OwnedCardModel};
use crate::shared::AppError;

/// Trait for account storage: balances plus the embedded statistics cache.
#[async_trait]
pub trait AccountRepository {
    /// Inserts a new account; fails if the id is already taken.
    async fn create_account(&self, account: &AccountModel) -> Result<(), AppError>;
    async fn get_account(&self, account_id: &str) -> Result<Option<AccountModel>, AppError>;
    /// Whole-record upsert of an existing account.
    async fn put_account(&self, account: &AccountModel) -> Result<(), AppError>;
    async fn list_accounts(&self) -> Result<Vec<AccountModel>, AppError>;
}

/// Trait for the owned-card ledger, keyed by (account, card).
#[async_trait]
pub trait CollectionRepository {
    async fn get_owned_cards(&self, account_id: &str) -> Result<Vec<OwnedCardModel>, AppError>;
    async fn get_owned_card(
        &self,
        account_id: &str,
        card_id: &str,
    ) -> Result<Option<OwnedCardModel>, AppError>;
    async fn put_owned_card(&self, entry: &OwnedCardModel) -> Result<(), AppError>;
}

/// In-memory implementation of AccountRepository for development and testing
pub struct InMemoryAccountRepository {
    accounts: Mutex<HashMap<String, AccountModel>>,
}

impl Default for InMemoryAccountRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAccountRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated accounts
    pub fn with_accounts(accounts: Vec<AccountModel>) -> Self {
        let mut account_map = HashMap::new();
        for account in accounts {
            account_map.insert(account.id.clone(), account);
        }

        Self {
            accounts: Mutex::new(account_map),
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    #[instrument(skip(self, account))]
    async fn create_account(&self, account: &AccountModel) -> Result<(), AppError> {
        debug!(account_id = %account.id, username = %account.username, "Creating account in memory");

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&account.id) {
            warn!(account_id = %account.id, "Account already exists in memory");
            return Err(AppError::DatabaseError("Account already exists".to_string()));
        }
        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_account(&self, account_id: &str) -> Result<Option<AccountModel>, AppError> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.get(account_id).cloned())
    }

    #[instrument(skip(self, account))]
    async fn put_account(&self, account: &AccountModel) -> Result<(), AppError> {
        debug!(account_id = %account.id, "Persisting account in memory");
        let mut accounts = self.accounts.lock().unwrap();
        accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_accounts(&self) -> Result<Vec<AccountModel>, AppError> {
        let accounts = self.accounts.lock().unwrap();
        let mut list: Vec<AccountModel> = accounts.values().cloned().collect();
        list.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(list)
    }
}

/// In-memory implementation of CollectionRepository for development and testing
pub struct InMemoryCollectionRepository {
    owned: Mutex<HashMap<(String, String), OwnedCardModel>>,
}

impl Default for InMemoryCollectionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCollectionRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            owned: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl CollectionRepository for InMemoryCollectionRepository {
    #[instrument(skip(self))]
    async fn get_owned_cards(&self, account_id: &str) -> Result<Vec<OwnedCardModel>, AppError> {
        let owned = self.owned.lock().unwrap();
        let mut entries: Vec<OwnedCardModel> = owned
            .values()
            .filter(|entry| entry.account_id == account_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.obtained_at
                .cmp(&b.obtained_at)
                .then_with(|| a.card_id.cmp(&b.card_id))
        });
        Ok(entries)
    }

    #[instrument(skip(self))]
    async fn get_owned_card(
        &self,
        account_id: &str,
        card_id: &str,
    ) -> Result<Option<OwnedCardModel>, AppError> {
        let owned = self.owned.lock().unwrap();
        Ok(owned
            .get(&(account_id.to_string(), card_id.to_string()))
            .cloned())
    }

    #[instrument(skip(self, entry))]
    async fn put_owned_card(&self, entry: &OwnedCardModel) -> Result<(), AppError> {
        debug!(
            account_id = %entry.account_id,
            card_id = %entry.card_id,
            quantity = entry.quantity,
            "Persisting owned-card entry in memory"
        );
        let mut owned = self.owned.lock().unwrap();
        owned.insert(
            (entry.account_id.clone(), entry.card_id.clone()),
            entry.clone(),
        );
        Ok(())
    }
}
