use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use price_tuner::{
    auth::TokenService,
    catalog::{Catalog, MemoryCatalog, PgCatalog},
    config::AppConfig,
    create_router, db,
    store::{MemoryOptionStore, OptionStore, PgOptionStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Price Tuner - Starting...");

    let config = AppConfig::from_env()?;

    let (catalog, options): (Arc<dyn Catalog>, Arc<dyn OptionStore>) = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url).await?;
            db::run_migrations(&pool).await?;
            (
                Arc::new(PgCatalog::new(pool.clone())),
                Arc::new(PgOptionStore::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory catalog and option store");
            (Arc::new(MemoryCatalog::new()), Arc::new(MemoryOptionStore::new()))
        }
    };

    let state = AppState::new(catalog, options, TokenService::new(config.jwt_secret.clone()));
    let app = create_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Price Tuner is running on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
