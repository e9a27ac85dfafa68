pub mod handlers;
pub mod models;
pub mod repository;

pub use models::{AccountModel, OwnedCardModel, PackGachaSummary, UserStatistics};
pub use repository::{
    AccountRepository, CollectionRepository, InMemoryAccountRepository,
    InMemoryCollectionRepository,
};
