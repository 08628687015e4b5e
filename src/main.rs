//! LiveBoard Server: real-time chat presence and message coordination.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use liveboard_api::AppState;
use liveboard_core::config::{AppConfig, StoreProvider};
use liveboard_core::error::AppError;
use liveboard_database::{
    DatabasePool, MemoryStore, MessageStore, PgMessageStore, PgUserStore, UserStore,
};

#[tokio::main]
async fn main() {
    let env = std::env::var("LIVEBOARD_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting LiveBoard v{}", env!("CARGO_PKG_VERSION"));

    let (users, messages, pool): (Arc<dyn UserStore>, Arc<dyn MessageStore>, _) =
        match config.store.provider {
            StoreProvider::Postgres => {
                tracing::info!("Connecting to database...");
                let pool = DatabasePool::connect(&config.database).await?;

                tracing::info!("Running database migrations...");
                liveboard_database::migration::run_migrations(pool.pool()).await?;
                tracing::info!("Database migrations complete");

                (
                    Arc::new(PgUserStore::new(pool.pool().clone())),
                    Arc::new(PgMessageStore::new(pool.pool().clone())),
                    Some(pool),
                )
            }
            StoreProvider::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                let store = Arc::new(MemoryStore::new());
                (store.clone(), store, None)
            }
        };

    let state = AppState::new(config, users, messages);
    liveboard_api::serve(state).await?;

    if let Some(pool) = pool {
        pool.close().await;
    }

    tracing::info!("LiveBoard server stopped");
    Ok(())
}
