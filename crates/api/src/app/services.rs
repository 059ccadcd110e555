//! Storage wiring: picks the backend named in the configuration and wraps it in the engine facade.

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::info;

use warehouse_core::{Deadline, InventoryResult};
use warehouse_infra::{InMemoryInventoryStore, InventoryFacade, PostgresInventoryStore};
use warehouse_inventory::{Article, NewArticle};
use warehouse_products::{NewProduct, ProductAvailability};

use crate::config::{Config, PostgresConfig, StoreConfig};

/// The engine, over whichever store this process runs with.
#[derive(Debug, Clone)]
pub enum AppServices {
    InMemory(InventoryFacade<InMemoryInventoryStore>),
    Postgres(InventoryFacade<PostgresInventoryStore>),
}

// Both arms expose the same facade API; forward to whichever one is live.
macro_rules! forward {
    ($self:ident, $facade:ident => $call:expr) => {
        match $self {
            AppServices::InMemory($facade) => $call.await,
            AppServices::Postgres($facade) => $call.await,
        }
    };
}

impl AppServices {
    /// Fresh in-memory engine (dev/test).
    pub fn in_memory() -> Self {
        AppServices::InMemory(InventoryFacade::new(InMemoryInventoryStore::new()))
    }

    pub async fn ping(&self, deadline: Deadline) -> InventoryResult<()> {
        forward!(self, f => f.ping(deadline))
    }

    pub async fn list_articles(&self, deadline: Deadline) -> InventoryResult<Vec<Article>> {
        forward!(self, f => f.list_articles(deadline))
    }

    pub async fn list_available_products(
        &self,
        deadline: Deadline,
    ) -> InventoryResult<Vec<ProductAvailability>> {
        forward!(self, f => f.list_available_products(deadline))
    }

    pub async fn upload_articles(
        &self,
        articles: Vec<NewArticle>,
        deadline: Deadline,
    ) -> InventoryResult<u64> {
        forward!(self, f => f.upload_articles(articles, deadline))
    }

    pub async fn upload_products(
        &self,
        products: Vec<NewProduct>,
        deadline: Deadline,
    ) -> InventoryResult<u64> {
        forward!(self, f => f.upload_products(products, deadline))
    }

    pub async fn sell(&self, product: &str, deadline: Deadline) -> InventoryResult<()> {
        forward!(self, f => f.sell(product, deadline))
    }
}

/// Connect to the configured store (applying the schema for Postgres).
pub async fn build_services(config: &Config) -> Result<AppServices> {
    match &config.store {
        StoreConfig::Memory => {
            info!("using in-memory store");
            Ok(AppServices::in_memory())
        }
        StoreConfig::Postgres(pg) => {
            let store = connect_postgres(pg, config).await?;
            Ok(AppServices::Postgres(InventoryFacade::new(store)))
        }
    }
}

async fn connect_postgres(pg: &PostgresConfig, config: &Config) -> Result<PostgresInventoryStore> {
    let options = PgConnectOptions::new()
        .host(&pg.host)
        .port(pg.port)
        .username(&pg.user)
        .password(&pg.password)
        .database(&pg.dbname);

    let pool = PgPoolOptions::new()
        .max_connections(16)
        .acquire_timeout(config.backend_timeout)
        .connect_with(options)
        .await
        .with_context(|| format!("failed to connect to postgres at {}:{}", pg.host, pg.port))?;

    let store = PostgresInventoryStore::new(pool);
    store
        .migrate()
        .await
        .context("failed to apply inventory schema")?;
    info!(host = %pg.host, database = %pg.dbname, "using postgres store");
    Ok(store)
}
