//! Product catalog: bills of materials keyed by product name.

use std::collections::BTreeMap;

use tracing::instrument;

use warehouse_core::{InventoryResult, ProductName};
use warehouse_products::{Component, Product};

use crate::store::{InventoryStore, StockTransaction, TxMode};

#[derive(Debug, Clone)]
pub struct ProductCatalog<S> {
    store: S,
}

impl<S> ProductCatalog<S>
where
    S: InventoryStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Catalogue every product in one transaction; returns the number of
    /// products (not component rows) inserted.
    #[instrument(skip(self, products), fields(count = products.len()), err)]
    pub async fn bulk_insert(&self, products: Vec<Product>) -> InventoryResult<u64> {
        let mut tx = self.store.begin(TxMode::Bulk).await?;
        for product in &products {
            tx.insert_product(product).await?;
        }
        tx.commit().await?;
        Ok(products.len() as u64)
    }

    pub async fn exists(&self, tx: &mut S::Tx, name: &ProductName) -> InventoryResult<bool> {
        Ok(tx.product_exists(name).await?)
    }

    /// Components of `name`, ordered by `art_id`; empty when unknown.
    pub async fn components_of(
        &self,
        tx: &mut S::Tx,
        name: &ProductName,
    ) -> InventoryResult<Vec<Component>> {
        Ok(tx.components_of(name).await?)
    }

    /// Every product with its components, ordered by name.
    pub async fn all_in(
        &self,
        tx: &mut S::Tx,
    ) -> InventoryResult<BTreeMap<ProductName, Vec<Component>>> {
        Ok(tx.catalog().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::ArticleLedger;
    use crate::store::InMemoryInventoryStore;
    use warehouse_core::{ArticleId, ErrorKind};
    use warehouse_inventory::Article;

    fn product(name: &str, parts: &[(&str, u64)]) -> Product {
        Product::new(
            ProductName::new(name).unwrap(),
            parts
                .iter()
                .map(|(id, q)| Component::new(ArticleId::new(*id).unwrap(), *q).unwrap())
                .collect(),
        )
        .unwrap()
    }

    async fn stocked() -> InMemoryInventoryStore {
        let store = InMemoryInventoryStore::new();
        ArticleLedger::new(store.clone())
            .bulk_insert(vec![
                Article::new(ArticleId::new("1").unwrap(), "leg", 12).unwrap(),
                Article::new(ArticleId::new("2").unwrap(), "screw", 17).unwrap(),
            ])
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn counts_products_not_rows() {
        let store = stocked().await;
        let catalog = ProductCatalog::new(store.clone());
        let inserted = catalog
            .bulk_insert(vec![
                product("Chair", &[("1", 4), ("2", 8)]),
                product("Stool", &[("1", 3)]),
            ])
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let mut tx = store.begin(TxMode::ReadOnly).await.unwrap();
        let chair = ProductName::new("Chair").unwrap();
        assert!(catalog.exists(&mut tx, &chair).await.unwrap());
        let parts = catalog.components_of(&mut tx, &chair).await.unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].art_id().as_str(), "1");
        assert_eq!(catalog.all_in(&mut tx).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_article_rejects_the_whole_batch() {
        let store = stocked().await;
        let catalog = ProductCatalog::new(store.clone());
        let err = catalog
            .bulk_insert(vec![
                product("Chair", &[("1", 4)]),
                product("Table", &[("1", 4), ("99", 1)]),
            ])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceError);

        let mut tx = store.begin(TxMode::ReadOnly).await.unwrap();
        assert!(catalog.all_in(&mut tx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn product_names_are_catalogued_once() {
        let store = stocked().await;
        let catalog = ProductCatalog::new(store);
        catalog
            .bulk_insert(vec![product("Chair", &[("1", 4)])])
            .await
            .unwrap();
        let err = catalog
            .bulk_insert(vec![product("Chair", &[("2", 1)])])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceError);
    }
}
