use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use outfitter_agent::market::MarketDataClient;
use outfitter_agent::AgentRuntime;
use outfitter_core::config::{AppConfig, ConfigError, LoadOptions};
use outfitter_db::{
    connect_with_settings, migrations, CatalogError, DbPool, SqlCheckpointStore, StaticCatalog,
};

use crate::gateway::SimulatedPaymentGateway;
use crate::market::{HttpMarketDataClient, NoopMarketDataClient};
use crate::openrouter::OpenRouterClient;
use crate::routes::AppState;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("catalog data failed to load: {0}")]
    Catalog(#[from] CatalogError),
    #[error("http client initialization failed: {0}")]
    HttpClient(String),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let catalog = if config.data.dir.join("products.json").exists() {
        let catalog = StaticCatalog::from_data_dir(&config.data.dir)?;
        info!(
            event_name = "system.bootstrap.catalog_loaded",
            correlation_id = "bootstrap",
            data_dir = %config.data.dir.display(),
            products = catalog.products().len(),
            "catalog loaded from data directory"
        );
        Arc::new(catalog)
    } else {
        info!(
            event_name = "system.bootstrap.catalog_seeded",
            correlation_id = "bootstrap",
            data_dir = %config.data.dir.display(),
            "data directory has no products.json, using embedded demo dataset"
        );
        Arc::new(StaticCatalog::from_seed())
    };

    let llm = Arc::new(
        OpenRouterClient::from_config(&config.llm)
            .map_err(|error| BootstrapError::HttpClient(error.to_string()))?,
    );

    let market: Arc<dyn MarketDataClient> = match HttpMarketDataClient::from_config(&config.market)
        .map_err(|error| BootstrapError::HttpClient(error.to_string()))?
    {
        Some(client) => Arc::new(client),
        None => Arc::new(NoopMarketDataClient),
    };

    let checkpoints = Arc::new(SqlCheckpointStore::new(db_pool.clone()));
    let runtime =
        AgentRuntime::new(llm, checkpoints, catalog.clone(), catalog.clone(), market);

    let state = AppState {
        runtime: Arc::new(runtime),
        catalog: catalog.clone(),
        orders: catalog,
        gateway: Arc::new(SimulatedPaymentGateway::new(config.gateway.publishable_key.clone())),
    };

    Ok(Application { config, db_pool, state })
}

#[cfg(test)]
mod tests {
    use outfitter_core::config::{ConfigOverrides, LoadOptions};

    use super::bootstrap;

    #[tokio::test]
    async fn bootstrap_prepares_schema_catalog_and_runtime() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:?cache=shared".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await
        .expect("bootstrap should succeed with in-memory database");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name = 'session_checkpoint'",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("checkpoint table should exist after bootstrap");
        assert_eq!(table_count, 1);

        assert!(!app.state.catalog.search("", None).await.is_empty(), "demo catalog is loaded");

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_invalid_config() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                log_level: Some("verbose".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("invalid log level must fail").to_string();
        assert!(message.contains("unsupported log level"));
    }
}
