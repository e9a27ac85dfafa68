pub mod cache;
pub mod handlers;
pub mod models;
pub mod service;

pub use cache::StatsCache;
pub use models::{ActivityWindows, GlobalStatistics, PopularPack};
pub use service::StatsService;
