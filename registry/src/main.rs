use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use repo_registry::config::{Config, ConfigError, StorageBackend};
use repo_registry::storage::{MemoryStore, PostgresStore, RecordStore};
use repo_registry::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repo_registry=debug,tower_http=debug".into()),
        )
        .init();

    // Load config
    let config = Config::load()?;
    info!("Config loaded successfully");

    // Initialize record store
    let store: Arc<dyn RecordStore> = match config.storage {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or(ConfigError::MissingDatabaseUrl)?;
            let store = PostgresStore::connect(database_url, config.db_pool_size)
                .await
                .context("Failed to connect to database")?;
            store
                .migrate()
                .await
                .context("Failed to run database migrations")?;
            Arc::new(store)
        }
    };
    info!("Record store initialized ({})", store.backend());

    let app = build_router(AppState::new(store));

    // Start HTTP server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Repository registry listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
