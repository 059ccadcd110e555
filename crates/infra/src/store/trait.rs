use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use warehouse_core::{ArticleId, InventoryError, ProductName};
use warehouse_inventory::Article;
use warehouse_products::{Component, Product};

/// What a transaction is opened for.
///
/// The mode decides the isolation a backend must provide:
///
/// - **ReadOnly**: one consistent snapshot across articles and products; no writes.
/// - **ReadWrite**: row-level locks on every article read through
///   [`StockTransaction::read_stock`], held until commit or rollback.
/// - **Bulk**: inserts only; concurrent readers observe either none or all of them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TxMode {
    ReadOnly,
    ReadWrite,
    Bulk,
}

impl core::fmt::Display for TxMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TxMode::ReadOnly => f.write_str("read_only"),
            TxMode::ReadWrite => f.write_str("read_write"),
            TxMode::Bulk => f.write_str("bulk"),
        }
    }
}

/// Storage operation error.
///
/// These are **infrastructure errors**. They never leave the engine as-is:
/// `From<StoreError> for InventoryError` classifies them first.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A conditional write lost against a concurrent modification.
    #[error("write conflict: {0}")]
    Conflict(String),

    /// A row with the same key already exists.
    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// A row references an article that does not exist.
    #[error("foreign key violation: {0}")]
    ForeignKey(String),

    /// The operation is not permitted in a transaction of this mode.
    #[error("{operation} is not allowed in a {mode} transaction")]
    InvalidMode { mode: TxMode, operation: &'static str },

    /// The backend could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure.
    #[error("database error: {0}")]
    Database(String),
}

impl From<StoreError> for InventoryError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) => InventoryError::conflict(msg),
            other => InventoryError::persistence(other.to_string()),
        }
    }
}

/// One open storage transaction.
///
/// Dropping a transaction without calling [`commit`](StockTransaction::commit)
/// rolls it back; nothing it wrote becomes visible.
#[async_trait]
pub trait StockTransaction: Send {
    fn mode(&self) -> TxMode;

    /// Insert a new article row (`Bulk` only).
    async fn insert_article(&mut self, article: &Article) -> Result<(), StoreError>;

    /// All articles, ordered by `art_id` ascending.
    async fn list_articles(&mut self) -> Result<Vec<Article>, StoreError>;

    /// Insert one catalog row per component (`Bulk` only).
    ///
    /// Fails with `Duplicate` if the product name is already catalogued and
    /// with `ForeignKey` if a component references an unknown article.
    async fn insert_product(&mut self, product: &Product) -> Result<(), StoreError>;

    /// True iff at least one component row exists for `product`.
    async fn product_exists(&mut self, product: &ProductName) -> Result<bool, StoreError>;

    /// Components of `product`, ordered by `art_id`; empty if unknown.
    async fn components_of(&mut self, product: &ProductName) -> Result<Vec<Component>, StoreError>;

    /// Every catalogued product with its components.
    async fn catalog(&mut self) -> Result<BTreeMap<ProductName, Vec<Component>>, StoreError>;

    /// Current stock of the given articles; unknown ids are absent from the result.
    ///
    /// In `ReadWrite` mode the rows are locked (in ascending `art_id` order)
    /// until the transaction ends. Lock everything a transaction will touch in
    /// a single call.
    async fn read_stock(
        &mut self,
        art_ids: &[ArticleId],
    ) -> Result<BTreeMap<ArticleId, u64>, StoreError>;

    /// Take `amount` units from `art_id` (`ReadWrite` only).
    ///
    /// Conditional: fails with `Conflict` when the row is missing or holds
    /// less than `amount`, leaving it untouched.
    async fn decrement(&mut self, art_id: &ArticleId, amount: u64) -> Result<(), StoreError>;

    /// Make every write of this transaction durable and visible at once.
    async fn commit(self) -> Result<(), StoreError>;
}

/// Storage handle shared by the engine components.
///
/// Implementations must:
/// - keep `inventory.stock >= 0` at all times
/// - give `ReadOnly` transactions a snapshot no concurrent commit can tear
/// - serialise `ReadWrite` transactions only on the article rows they share
/// - make each `Bulk` transaction all-or-nothing
#[async_trait]
pub trait InventoryStore: Send + Sync {
    type Tx: StockTransaction + 'static;

    /// Liveness check of the underlying storage.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn begin(&self, mode: TxMode) -> Result<Self::Tx, StoreError>;
}

#[async_trait]
impl<S> InventoryStore for Arc<S>
where
    S: InventoryStore + ?Sized,
{
    type Tx = S::Tx;

    async fn ping(&self) -> Result<(), StoreError> {
        (**self).ping().await
    }

    async fn begin(&self, mode: TxMode) -> Result<Self::Tx, StoreError> {
        (**self).begin(mode).await
    }
}
