// Library crate for the gacha engine
// This file exposes the public API for integration tests

pub mod account;
pub mod catalog;
pub mod gacha;
pub mod history;
pub mod shared;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use account::{AccountModel, InMemoryAccountRepository, InMemoryCollectionRepository};
pub use catalog::{CardModel, CardPackModel, CardRarity, CurrencyType, InMemoryCatalogRepository};
pub use gacha::{
    DrawCount, GachaError, GachaRequest, GachaResult, GachaService, InMemoryPityRepository,
};
pub use history::InMemoryHistoryRepository;
pub use shared::{AppError, AppState};
pub use stats::{StatsCache, StatsService};
