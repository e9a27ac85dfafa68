mod account;
mod catalog;
mod gacha;
mod history;
mod shared;
mod stats;

use axum::{
    routing::{get, post},
    Router,
};
use account::repository::{InMemoryAccountRepository, InMemoryCollectionRepository};
use catalog::repository::InMemoryCatalogRepository;
use gacha::pity::InMemoryPityRepository;
use history::repository::InMemoryHistoryRepository;
// use history::repository::PostgresHistoryRepository; // For production
use shared::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gachapon=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gacha engine server");

    // Create shared application state with dependency injection
    // Easy to switch between implementations:
    let catalog_repository = Arc::new(InMemoryCatalogRepository::new());
    let account_repository = Arc::new(InMemoryAccountRepository::new());
    let collection_repository = Arc::new(InMemoryCollectionRepository::new());
    let pity_repository = Arc::new(InMemoryPityRepository::new());
    let history_repository = Arc::new(InMemoryHistoryRepository::new());

    // For production with a durable history log:
    // let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    // let pool = sqlx::PgPool::connect(&database_url).await.expect("Failed to connect to database");
    // let history_repository = Arc::new(PostgresHistoryRepository::new(pool));

    let app_state = AppState::new(
        catalog_repository,
        account_repository,
        collection_repository,
        pity_repository,
        history_repository,
    );

    // build our application
    let app = Router::new()
        .route("/", get(|| async { "Hello, World!" }))
        .route("/gacha", post(gacha::handlers::perform_gacha))
        .route("/accounts", post(account::handlers::create_account))
        .route("/accounts/:id", get(account::handlers::get_account))
        .route(
            "/accounts/:id/collection",
            get(account::handlers::get_collection),
        )
        .route(
            "/accounts/:id/history",
            get(history::handlers::get_account_history),
        )
        .route(
            "/accounts/:id/statistics",
            get(stats::handlers::get_account_statistics),
        )
        .route("/statistics", get(stats::handlers::get_global_statistics))
        .route(
            "/cards",
            get(catalog::handlers::list_cards).put(catalog::handlers::upsert_card),
        )
        .route(
            "/cards/:id",
            get(catalog::handlers::get_card).delete(catalog::handlers::delete_card),
        )
        .route(
            "/packs",
            get(catalog::handlers::list_packs).put(catalog::handlers::upsert_pack),
        )
        .route(
            "/packs/:id",
            get(catalog::handlers::get_pack).delete(catalog::handlers::delete_pack),
        )
        .route(
            "/templates",
            get(catalog::handlers::list_templates).put(catalog::handlers::upsert_template),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
