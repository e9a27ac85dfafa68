use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::GachaRecordModel;
use crate::catalog::models::CurrencyType;
use crate::gacha::models::GachaResult;
use crate::shared::AppError;

/// Trait for the append-only history log. There is no update or delete:
/// records are immutable once written.
#[async_trait]
pub trait HistoryRepository {
    async fn append(&self, record: &GachaRecordModel) -> Result<(), AppError>;
    /// Records for one account, newest first.
    async fn get_for_account(&self, account_id: &str)
        -> Result<Vec<GachaRecordModel>, AppError>;
    /// Every record across all accounts, for global aggregation.
    async fn get_all(&self) -> Result<Vec<GachaRecordModel>, AppError>;
}

/// In-memory implementation of HistoryRepository for development and testing
///
/// Records are kept in append order, which is creation order.
pub struct InMemoryHistoryRepository {
    records: Mutex<Vec<GachaRecordModel>>,
}

impl Default for InMemoryHistoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHistoryRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    /// Returns the current number of records in the log
    pub fn record_count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    #[instrument(skip(self, record))]
    async fn append(&self, record: &GachaRecordModel) -> Result<(), AppError> {
        debug!(
            record_id = %record.id,
            account_id = %record.account_id,
            pack_id = %record.pack_id,
            "Appending history record in memory"
        );
        let mut records = self.records.lock().unwrap();
        records.push(record.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_for_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<GachaRecordModel>, AppError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .filter(|record| record.account_id == account_id)
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<GachaRecordModel>, AppError> {
        let records = self.records.lock().unwrap();
        Ok(records.clone())
    }
}

/// PostgreSQL implementation of the history log
pub struct PostgresHistoryRepository {
    pool: PgPool,
}

impl PostgresHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<GachaRecordModel, AppError> {
        let currency: String = row.get("pack_currency");
        let pack_currency = currency
            .parse::<CurrencyType>()
            .map_err(|e| AppError::DatabaseError(format!("bad currency column: {e}")))?;
        let sqlx::types::Json(result) = row.get::<sqlx::types::Json<GachaResult>, _>("result");
        let pack_cost: i64 = row.get("pack_cost");
        let quantity: i32 = row.get("quantity");

        Ok(GachaRecordModel {
            id: row.get("id"),
            account_id: row.get("account_id"),
            pack_id: row.get("pack_id"),
            pack_name: row.get("pack_name"),
            pack_description: row.get("pack_description"),
            pack_cover_image_url: row.get("pack_cover_image_url"),
            pack_currency,
            pack_cost: pack_cost as u64,
            quantity: quantity as u32,
            result,
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl HistoryRepository for PostgresHistoryRepository {
    #[instrument(skip(self, record))]
    async fn append(&self, record: &GachaRecordModel) -> Result<(), AppError> {
        debug!(record_id = %record.id, account_id = %record.account_id, "Appending history record to database");

        sqlx::query(
            "INSERT INTO gacha_history \
             (id, account_id, pack_id, pack_name, pack_description, pack_cover_image_url, \
              pack_currency, pack_cost, quantity, result, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&record.id)
        .bind(&record.account_id)
        .bind(&record.pack_id)
        .bind(&record.pack_name)
        .bind(&record.pack_description)
        .bind(&record.pack_cover_image_url)
        .bind(record.pack_currency.to_string())
        .bind(record.pack_cost as i64)
        .bind(record.quantity as i32)
        .bind(sqlx::types::Json(&record.result))
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to append history record");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_for_account(
        &self,
        account_id: &str,
    ) -> Result<Vec<GachaRecordModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, account_id, pack_id, pack_name, pack_description, \
             pack_cover_image_url, pack_currency, pack_cost, quantity, result, created_at \
             FROM gacha_history WHERE account_id = $1 ORDER BY created_at DESC",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, account_id = %account_id, "Failed to fetch account history");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(Self::record_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn get_all(&self) -> Result<Vec<GachaRecordModel>, AppError> {
        let rows = sqlx::query(
            "SELECT id, account_id, pack_id, pack_name, pack_description, \
             pack_cover_image_url, pack_currency, pack_cost, quantity, result, created_at \
             FROM gacha_history ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch full history");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(Self::record_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(account_id: &str, pack_id: &str) -> GachaRecordModel {
        GachaRecordModel {
            id: uuid::Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            pack_id: pack_id.to_string(),
            pack_name: format!("Pack {pack_id}"),
            pack_description: String::new(),
            pack_cover_image_url: String::new(),
            pack_currency: CurrencyType::Gold,
            pack_cost: 100,
            quantity: 1,
            result: GachaResult {
                cards: vec![],
                new_cards: vec![],
                duplicates: vec![],
                currency_spent: 100,
                currency: CurrencyType::Gold,
                pity_triggered: false,
                timestamp: Utc::now(),
            },
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn account_history_is_newest_first() {
        let repo = InMemoryHistoryRepository::new();
        let first = record("acct", "pack-a");
        let second = record("acct", "pack-b");
        repo.append(&first).await.unwrap();
        repo.append(&second).await.unwrap();

        let history = repo.get_for_account("acct").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].pack_id, "pack-b");
        assert_eq!(history[1].pack_id, "pack-a");
    }

    #[tokio::test]
    async fn history_is_filtered_per_account() {
        let repo = InMemoryHistoryRepository::new();
        repo.append(&record("acct-1", "pack-a")).await.unwrap();
        repo.append(&record("acct-2", "pack-a")).await.unwrap();

        assert_eq!(repo.get_for_account("acct-1").await.unwrap().len(), 1);
        assert_eq!(repo.get_all().await.unwrap().len(), 2);
    }
}
