//! Postgres-backed inventory store.
//!
//! ## Isolation
//!
//! | Mode | Isolation | Locking |
//! |------|-----------|---------|
//! | `ReadOnly` | `REPEATABLE READ, READ ONLY` | none (one MVCC snapshot for both tables) |
//! | `ReadWrite` | `READ COMMITTED` | `SELECT … FOR UPDATE` on touched articles, ordered by `art_id` |
//! | `Bulk` | `READ COMMITTED` | row inserts; invisible until commit |
//!
//! The decrement is itself conditional (`WHERE stock >= $2`), so even a caller
//! that skipped the locking read cannot drive stock negative.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (foreign key violation) | `23503` | `ForeignKey` |
//! | Database (check violation) | `23514` | `Conflict` |
//! | Database (serialization failure / deadlock) | `40001` / `40P01` | `Conflict` |
//! | Database (other) | any other | `Database` |
//! | PoolTimedOut / PoolClosed / Io | N/A | `Unavailable` |
//! | Other | N/A | `Database` |

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::instrument;

use warehouse_core::{ArticleId, ProductName};
use warehouse_inventory::Article;
use warehouse_products::{Component, Product};

use super::r#trait::{InventoryStore, StockTransaction, StoreError, TxMode};

const SCHEMA: &str = include_str!("../../migrations/0001_inventory.sql");

/// Postgres-backed inventory store.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct PostgresInventoryStore {
    pool: Arc<PgPool>,
}

impl PostgresInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `inventory` and `product` tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for PostgresInventoryStore {
    type Tx = PostgresTransaction;

    #[instrument(skip(self), err)]
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }

    #[instrument(skip(self, mode), fields(mode = %mode), err)]
    async fn begin(&self, mode: TxMode) -> Result<Self::Tx, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let isolation = match mode {
            TxMode::ReadOnly => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY",
            TxMode::ReadWrite | TxMode::Bulk => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
        };
        sqlx::query(isolation)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_isolation", e))?;

        Ok(PostgresTransaction { tx, mode })
    }
}

/// Transaction over a [`PostgresInventoryStore`].
///
/// Dropping it without commit issues a rollback on the connection.
#[derive(Debug)]
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
    mode: TxMode,
}

impl PostgresTransaction {
    fn require(&self, allowed: TxMode, operation: &'static str) -> Result<(), StoreError> {
        if self.mode != allowed {
            return Err(StoreError::InvalidMode {
                mode: self.mode,
                operation,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StockTransaction for PostgresTransaction {
    fn mode(&self) -> TxMode {
        self.mode
    }

    async fn insert_article(&mut self, article: &Article) -> Result<(), StoreError> {
        self.require(TxMode::Bulk, "insert_article")?;
        sqlx::query("INSERT INTO inventory (art_id, art_name, stock) VALUES ($1, $2, $3)")
            .bind(article.art_id().as_str())
            .bind(article.name())
            .bind(to_db_count(article.stock())?)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_article", e))?;
        Ok(())
    }

    async fn list_articles(&mut self) -> Result<Vec<Article>, StoreError> {
        let rows = sqlx::query("SELECT art_id, art_name, stock FROM inventory ORDER BY art_id")
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("list_articles", e))?;
        rows.iter().map(article_from_row).collect()
    }

    async fn insert_product(&mut self, product: &Product) -> Result<(), StoreError> {
        self.require(TxMode::Bulk, "insert_product")?;

        // Products are immutable once catalogued: refuse to graft new
        // components onto an existing name.
        if self.product_exists(product.name()).await? {
            return Err(StoreError::Duplicate(format!(
                "product '{}' already exists",
                product.name()
            )));
        }

        for component in product.components() {
            sqlx::query("INSERT INTO product (product_name, art_id, amount) VALUES ($1, $2, $3)")
                .bind(product.name().as_str())
                .bind(component.art_id().as_str())
                .bind(to_db_count(component.amount_required())?)
                .execute(&mut *self.tx)
                .await
                .map_err(|e| map_sqlx_error("insert_product", e))?;
        }
        Ok(())
    }

    async fn product_exists(&mut self, product: &ProductName) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM product WHERE product_name = $1)")
            .bind(product.as_str())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("product_exists", e))?;
        row.try_get::<bool, _>(0)
            .map_err(|e| map_sqlx_error("product_exists", e))
    }

    async fn components_of(&mut self, product: &ProductName) -> Result<Vec<Component>, StoreError> {
        let rows = sqlx::query(
            "SELECT art_id, amount FROM product WHERE product_name = $1 ORDER BY art_id",
        )
        .bind(product.as_str())
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("components_of", e))?;
        rows.iter().map(component_from_row).collect()
    }

    async fn catalog(&mut self) -> Result<BTreeMap<ProductName, Vec<Component>>, StoreError> {
        let rows = sqlx::query(
            "SELECT product_name, art_id, amount FROM product ORDER BY product_name, art_id",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("catalog", e))?;

        let mut catalog: BTreeMap<ProductName, Vec<Component>> = BTreeMap::new();
        for row in &rows {
            let name: String = row
                .try_get("product_name")
                .map_err(|e| map_sqlx_error("catalog", e))?;
            let name = ProductName::new(name)
                .map_err(|e| StoreError::Database(format!("corrupt product row: {e}")))?;
            catalog.entry(name).or_default().push(component_from_row(row)?);
        }
        Ok(catalog)
    }

    async fn read_stock(
        &mut self,
        art_ids: &[ArticleId],
    ) -> Result<BTreeMap<ArticleId, u64>, StoreError> {
        let sql = if self.mode == TxMode::ReadWrite {
            "SELECT art_id, stock FROM inventory WHERE art_id = ANY($1) ORDER BY art_id FOR UPDATE"
        } else {
            "SELECT art_id, stock FROM inventory WHERE art_id = ANY($1) ORDER BY art_id"
        };
        let ids: Vec<String> = art_ids.iter().map(|id| id.as_str().to_string()).collect();

        let rows = sqlx::query(sql)
            .bind(ids)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("read_stock", e))?;

        rows.iter()
            .map(|row| {
                let art_id = article_id_from_row(row)?;
                let stock = count_from_row(row, "stock")?;
                Ok((art_id, stock))
            })
            .collect()
    }

    async fn decrement(&mut self, art_id: &ArticleId, amount: u64) -> Result<(), StoreError> {
        self.require(TxMode::ReadWrite, "decrement")?;
        let result = sqlx::query(
            "UPDATE inventory SET stock = stock - $2 WHERE art_id = $1 AND stock >= $2",
        )
        .bind(art_id.as_str())
        .bind(to_db_count(amount)?)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("decrement", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict(format!(
                "article '{art_id}' has less than {amount} in stock"
            )));
        }
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

fn to_db_count(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::Database(format!("count {value} exceeds BIGINT range")))
}

fn count_from_row(row: &PgRow, column: &str) -> Result<u64, StoreError> {
    let value: i64 = row
        .try_get(column)
        .map_err(|e| map_sqlx_error("decode_row", e))?;
    u64::try_from(value)
        .map_err(|_| StoreError::Database(format!("negative {column} ({value}) in storage")))
}

fn article_id_from_row(row: &PgRow) -> Result<ArticleId, StoreError> {
    let raw: String = row
        .try_get("art_id")
        .map_err(|e| map_sqlx_error("decode_row", e))?;
    ArticleId::new(raw).map_err(|e| StoreError::Database(format!("corrupt art_id: {e}")))
}

fn article_from_row(row: &PgRow) -> Result<Article, StoreError> {
    let art_id = article_id_from_row(row)?;
    let name: String = row
        .try_get("art_name")
        .map_err(|e| map_sqlx_error("decode_row", e))?;
    let stock = count_from_row(row, "stock")?;
    Article::new(art_id, name, stock)
        .map_err(|e| StoreError::Database(format!("corrupt article row: {e}")))
}

fn component_from_row(row: &PgRow) -> Result<Component, StoreError> {
    let art_id = article_id_from_row(row)?;
    let amount = count_from_row(row, "amount")?;
    Component::new(art_id, amount)
        .map_err(|e| StoreError::Database(format!("corrupt product row: {e}")))
}

/// Map SQLx errors to `StoreError` (see the module-level table).
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db) => {
            let msg = format!("{operation}: {}", db.message());
            match db.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                Some("23503") => StoreError::ForeignKey(msg),
                Some("23514") | Some("40001") | Some("40P01") => StoreError::Conflict(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(format!("{operation}: {err}"))
        }
        other => StoreError::Database(format!("{operation}: {other}")),
    }
}
