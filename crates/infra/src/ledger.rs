//! Article ledger: the only owner of article quantities.

use std::collections::BTreeMap;

use tracing::instrument;

use warehouse_core::{ArticleId, InventoryResult};
use warehouse_inventory::Article;

use crate::store::{InventoryStore, StockTransaction, TxMode};

#[derive(Debug, Clone)]
pub struct ArticleLedger<S> {
    store: S,
}

impl<S> ArticleLedger<S>
where
    S: InventoryStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Insert every article in one transaction; returns how many were inserted.
    ///
    /// Either the whole batch becomes visible or none of it does.
    #[instrument(skip(self, articles), fields(count = articles.len()), err)]
    pub async fn bulk_insert(&self, articles: Vec<Article>) -> InventoryResult<u64> {
        let mut tx = self.store.begin(TxMode::Bulk).await?;
        for article in &articles {
            tx.insert_article(article).await?;
        }
        tx.commit().await?;
        Ok(articles.len() as u64)
    }

    /// All articles, ordered by `art_id`.
    #[instrument(skip(self), err)]
    pub async fn list_all(&self) -> InventoryResult<Vec<Article>> {
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let articles = tx.list_articles().await?;
        tx.commit().await?;
        Ok(articles)
    }

    /// Stock of `art_ids` as seen by `tx`. Locks the rows in a `ReadWrite` transaction.
    pub async fn stock_in(
        &self,
        tx: &mut S::Tx,
        art_ids: &[ArticleId],
    ) -> InventoryResult<BTreeMap<ArticleId, u64>> {
        Ok(tx.read_stock(art_ids).await?)
    }

    /// Take `amount` units of `art_id` inside `tx`.
    ///
    /// Callers check sufficiency in the same transaction first; a shortfall
    /// here still surfaces as `Conflict` rather than negative stock.
    pub async fn decrement(
        &self,
        tx: &mut S::Tx,
        art_id: &ArticleId,
        amount: u64,
    ) -> InventoryResult<()> {
        Ok(tx.decrement(art_id, amount).await?)
    }
}
