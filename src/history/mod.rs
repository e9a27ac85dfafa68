pub mod handlers;
pub mod models;
pub mod repository;

pub use models::GachaRecordModel;
pub use repository::{HistoryRepository, InMemoryHistoryRepository, PostgresHistoryRepository};
