pub mod handlers;
pub mod models;
pub mod pity;
pub mod reconciler;
pub mod resolver;
pub mod service;
pub mod validation;

mod errors;

pub use errors::GachaError;
pub use models::{DrawCount, DuplicateGroup, GachaRequest, GachaResult};
pub use pity::{InMemoryPityRepository, PityRepository};
pub use service::GachaService;
