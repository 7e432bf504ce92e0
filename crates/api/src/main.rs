use std::sync::Arc;

use anyhow::{Context, Result};
use civic_portal_api::{
    app::{create_app, AppState, Stores},
    config::{Config, StoreBackend},
    middleware,
};
use domain::store::{InMemoryRequestStore, InMemoryServiceCatalog};
use persistence::repositories::{RequestRepository, ServiceRepository};
use tracing::{info, warn};

async fn build_stores(config: &Config) -> Result<Stores> {
    match config.store.backend {
        StoreBackend::Postgres => {
            let db_config: persistence::db::DatabaseConfig = (&config.database).into();
            let pool = persistence::db::create_pool(&db_config)
                .await
                .context("Failed to connect to database")?;

            info!("Running database migrations...");
            persistence::db::run_migrations(&pool).await?;
            info!("Migrations completed");

            Ok(Stores {
                requests: Arc::new(RequestRepository::new(pool.clone())),
                catalog: Arc::new(ServiceRepository::new(pool)),
            })
        }
        StoreBackend::Memory => {
            warn!("Using in-memory request store; data is lost on restart");
            let catalog = Arc::new(InMemoryServiceCatalog::new());
            for service in &config.store.services {
                catalog.insert_service(service.clone().into()).await;
            }
            info!(services = config.store.services.len(), "Service catalog seeded");

            Ok(Stores {
                requests: Arc::new(InMemoryRequestStore::new(catalog.clone())),
                catalog,
            })
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    middleware::logging::init_logging(&config.logging)?;
    middleware::init_metrics()?;

    info!("Starting Civic Portal API v{}", env!("CARGO_PKG_VERSION"));

    let stores = build_stores(&config).await?;
    let addr = config.socket_addr()?;
    let state = AppState::new(config, stores).context("Invalid JWT configuration")?;
    let app = create_app(state);

    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
