pub mod handlers;
pub mod models;
pub mod repository;
pub mod schema;

pub use models::{CardModel, CardPackModel, CardRarity, CardTemplateModel, CurrencyType, PitySystem};
pub use repository::{CatalogRepository, InMemoryCatalogRepository};
pub use schema::{AttributeKind, AttributeValue};
