use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

use warehouse_core::{ArticleId, ProductName};
use warehouse_inventory::Article;
use warehouse_products::{Component, Product};

use super::r#trait::{InventoryStore, StockTransaction, StoreError, TxMode};

#[derive(Debug, Clone)]
struct ArticleRow {
    name: String,
    stock: u64,
}

impl ArticleRow {
    fn from_article(article: &Article) -> Self {
        Self {
            name: article.name().to_string(),
            stock: article.stock(),
        }
    }

    fn to_article(&self, art_id: &ArticleId, stock: u64) -> Result<Article, StoreError> {
        Article::new(art_id.clone(), self.name.clone(), stock)
            .map_err(|e| StoreError::Database(format!("corrupt article row: {e}")))
    }
}

/// Committed state. Each article row sits behind its own lock so sales only
/// contend on the articles they share.
#[derive(Debug, Default)]
struct Tables {
    articles: BTreeMap<ArticleId, Arc<Mutex<ArticleRow>>>,
    products: BTreeMap<ProductName, Vec<Component>>,
}

/// In-memory inventory store.
///
/// Intended for tests/dev and single-process deployments.
///
/// Locking model:
/// - `Bulk` holds the table lock exclusively, so no reader sees half an upload.
/// - `ReadWrite` holds the table lock shared plus the row locks it reads.
/// - `ReadOnly` copies a snapshot while holding the table lock shared and
///   every row lock at once.
///
/// Row locks are always taken in ascending `art_id` order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for InMemoryInventoryStore {
    type Tx = InMemoryTransaction;

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn begin(&self, mode: TxMode) -> Result<Self::Tx, StoreError> {
        let inner = match mode {
            TxMode::ReadOnly => TxInner::Snapshot(Snapshot::capture(&self.tables).await),
            TxMode::ReadWrite => TxInner::Locking(LockingTx {
                tables: self.tables.clone().read_owned().await,
                locked: BTreeMap::new(),
                pending: BTreeMap::new(),
            }),
            TxMode::Bulk => TxInner::Bulk(BulkTx {
                tables: self.tables.clone().write_owned().await,
                articles: BTreeMap::new(),
                products: BTreeMap::new(),
            }),
        };
        Ok(InMemoryTransaction { mode, inner })
    }
}

/// Transaction over an [`InMemoryInventoryStore`].
#[derive(Debug)]
pub struct InMemoryTransaction {
    mode: TxMode,
    inner: TxInner,
}

#[derive(Debug)]
enum TxInner {
    Snapshot(Snapshot),
    Locking(LockingTx),
    Bulk(BulkTx),
}

#[derive(Debug)]
struct Snapshot {
    articles: BTreeMap<ArticleId, ArticleRow>,
    products: BTreeMap<ProductName, Vec<Component>>,
}

impl Snapshot {
    async fn capture(tables: &RwLock<Tables>) -> Self {
        let tables = tables.read().await;

        // Hold every row lock before copying anything: a sale committing
        // midway would otherwise be half visible.
        let mut guards = Vec::with_capacity(tables.articles.len());
        for (id, row) in &tables.articles {
            guards.push((id, row.lock().await));
        }

        let articles = guards
            .iter()
            .map(|(id, row)| ((*id).clone(), ArticleRow::clone(row)))
            .collect();

        Self {
            articles,
            products: tables.products.clone(),
        }
    }
}

#[derive(Debug)]
struct LockingTx {
    tables: OwnedRwLockReadGuard<Tables>,
    locked: BTreeMap<ArticleId, OwnedMutexGuard<ArticleRow>>,
    /// Units taken per article, applied to the rows on commit.
    pending: BTreeMap<ArticleId, u64>,
}

impl LockingTx {
    async fn lock<'a>(&mut self, art_ids: impl IntoIterator<Item = &'a ArticleId>) {
        let wanted: BTreeSet<&ArticleId> = art_ids.into_iter().collect();
        for id in wanted {
            if self.locked.contains_key(id) {
                continue;
            }
            let Some(row) = self.tables.articles.get(id).cloned() else {
                continue;
            };
            let guard = row.lock_owned().await;
            self.locked.insert(id.clone(), guard);
        }
    }

    fn visible_stock(&self, art_id: &ArticleId) -> Option<u64> {
        let taken = self.pending.get(art_id).copied().unwrap_or(0);
        self.locked.get(art_id).map(|row| row.stock - taken)
    }

    fn commit(mut self) -> Result<(), StoreError> {
        for (id, amount) in &self.pending {
            let enough = self.locked.get(id).is_some_and(|row| row.stock >= *amount);
            if !enough {
                return Err(StoreError::Conflict(format!(
                    "article '{id}' changed before commit"
                )));
            }
        }
        for (id, amount) in &self.pending {
            if let Some(row) = self.locked.get_mut(id) {
                row.stock -= amount;
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
struct BulkTx {
    tables: OwnedRwLockWriteGuard<Tables>,
    articles: BTreeMap<ArticleId, ArticleRow>,
    products: BTreeMap<ProductName, Vec<Component>>,
}

impl BulkTx {
    fn article_exists(&self, art_id: &ArticleId) -> bool {
        self.tables.articles.contains_key(art_id) || self.articles.contains_key(art_id)
    }

    fn components(&self, product: &ProductName) -> Option<&Vec<Component>> {
        self.tables
            .products
            .get(product)
            .or_else(|| self.products.get(product))
    }

    async fn rows(&self) -> BTreeMap<ArticleId, ArticleRow> {
        let mut rows = self.articles.clone();
        for (id, row) in &self.tables.articles {
            // Uncontended: every row holder also holds the table lock.
            rows.insert(id.clone(), row.lock().await.clone());
        }
        rows
    }

    fn commit(self) {
        let BulkTx {
            mut tables,
            articles,
            products,
        } = self;
        for (id, row) in articles {
            tables.articles.insert(id, Arc::new(Mutex::new(row)));
        }
        tables.products.extend(products);
    }
}

fn invalid(mode: TxMode, operation: &'static str) -> StoreError {
    StoreError::InvalidMode { mode, operation }
}

impl InMemoryTransaction {
    fn products(&self) -> Option<&BTreeMap<ProductName, Vec<Component>>> {
        match &self.inner {
            TxInner::Snapshot(s) => Some(&s.products),
            TxInner::Locking(l) => Some(&l.tables.products),
            TxInner::Bulk(_) => None,
        }
    }
}

#[async_trait]
impl StockTransaction for InMemoryTransaction {
    fn mode(&self) -> TxMode {
        self.mode
    }

    async fn insert_article(&mut self, article: &Article) -> Result<(), StoreError> {
        let mode = self.mode;
        let TxInner::Bulk(bulk) = &mut self.inner else {
            return Err(invalid(mode, "insert_article"));
        };
        if bulk.article_exists(article.art_id()) {
            return Err(StoreError::Duplicate(format!(
                "article '{}' already exists",
                article.art_id()
            )));
        }
        bulk.articles
            .insert(article.art_id().clone(), ArticleRow::from_article(article));
        Ok(())
    }

    async fn list_articles(&mut self) -> Result<Vec<Article>, StoreError> {
        match &mut self.inner {
            TxInner::Snapshot(s) => s
                .articles
                .iter()
                .map(|(id, row)| row.to_article(id, row.stock))
                .collect(),
            TxInner::Locking(l) => {
                let ids: Vec<ArticleId> = l.tables.articles.keys().cloned().collect();
                l.lock(&ids).await;
                ids.iter()
                    .filter_map(|id| {
                        let stock = l.visible_stock(id)?;
                        Some(l.locked[id].to_article(id, stock))
                    })
                    .collect()
            }
            TxInner::Bulk(b) => b
                .rows()
                .await
                .iter()
                .map(|(id, row)| row.to_article(id, row.stock))
                .collect(),
        }
    }

    async fn insert_product(&mut self, product: &Product) -> Result<(), StoreError> {
        let mode = self.mode;
        let TxInner::Bulk(bulk) = &mut self.inner else {
            return Err(invalid(mode, "insert_product"));
        };
        if bulk.components(product.name()).is_some() {
            return Err(StoreError::Duplicate(format!(
                "product '{}' already exists",
                product.name()
            )));
        }
        if let Some(missing) = product
            .components()
            .iter()
            .find(|c| !bulk.article_exists(c.art_id()))
        {
            return Err(StoreError::ForeignKey(format!(
                "product '{}' references unknown article '{}'",
                product.name(),
                missing.art_id()
            )));
        }
        bulk.products
            .insert(product.name().clone(), product.components().to_vec());
        Ok(())
    }

    async fn product_exists(&mut self, product: &ProductName) -> Result<bool, StoreError> {
        Ok(match self.products() {
            Some(products) => products.contains_key(product),
            None => match &self.inner {
                TxInner::Bulk(b) => b.components(product).is_some(),
                _ => false,
            },
        })
    }

    async fn components_of(&mut self, product: &ProductName) -> Result<Vec<Component>, StoreError> {
        let found = match self.products() {
            Some(products) => products.get(product).cloned(),
            None => match &self.inner {
                TxInner::Bulk(b) => b.components(product).cloned(),
                _ => None,
            },
        };
        Ok(found.unwrap_or_default())
    }

    async fn catalog(&mut self) -> Result<BTreeMap<ProductName, Vec<Component>>, StoreError> {
        Ok(match &self.inner {
            TxInner::Snapshot(s) => s.products.clone(),
            TxInner::Locking(l) => l.tables.products.clone(),
            TxInner::Bulk(b) => {
                let mut all = b.tables.products.clone();
                all.extend(b.products.iter().map(|(k, v)| (k.clone(), v.clone())));
                all
            }
        })
    }

    async fn read_stock(
        &mut self,
        art_ids: &[ArticleId],
    ) -> Result<BTreeMap<ArticleId, u64>, StoreError> {
        match &mut self.inner {
            TxInner::Snapshot(s) => Ok(art_ids
                .iter()
                .filter_map(|id| s.articles.get(id).map(|row| (id.clone(), row.stock)))
                .collect()),
            TxInner::Locking(l) => {
                l.lock(art_ids).await;
                Ok(art_ids
                    .iter()
                    .filter_map(|id| l.visible_stock(id).map(|stock| (id.clone(), stock)))
                    .collect())
            }
            TxInner::Bulk(b) => {
                let rows = b.rows().await;
                Ok(art_ids
                    .iter()
                    .filter_map(|id| rows.get(id).map(|row| (id.clone(), row.stock)))
                    .collect())
            }
        }
    }

    async fn decrement(&mut self, art_id: &ArticleId, amount: u64) -> Result<(), StoreError> {
        let mode = self.mode;
        let TxInner::Locking(l) = &mut self.inner else {
            return Err(invalid(mode, "decrement"));
        };
        l.lock([art_id]).await;
        let current = l.visible_stock(art_id).ok_or_else(|| {
            StoreError::Conflict(format!("article '{art_id}' does not exist"))
        })?;
        if current < amount {
            return Err(StoreError::Conflict(format!(
                "article '{art_id}' has {current} in stock, {amount} required"
            )));
        }
        *l.pending.entry(art_id.clone()).or_insert(0) += amount;
        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        match self.inner {
            TxInner::Snapshot(_) => Ok(()),
            TxInner::Locking(l) => l.commit(),
            TxInner::Bulk(b) => {
                b.commit();
                Ok(())
            }
        }
    }
}
