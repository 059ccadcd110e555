//! Availability calculator: how many units of each product current stock can assemble.

use std::collections::{BTreeMap, BTreeSet};

use tracing::instrument;

use warehouse_core::{ArticleId, InventoryResult, ProductName};
use warehouse_products::{availability_report, available_units, Component, ProductAvailability};

use crate::catalog::ProductCatalog;
use crate::ledger::ArticleLedger;
use crate::store::{InventoryStore, StockTransaction, TxMode};

/// Components of one product together with the stock of those components,
/// both read in the same transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockView {
    pub components: Vec<Component>,
    pub stock: BTreeMap<ArticleId, u64>,
}

impl StockView {
    /// `min(floor(stock / amount_required))` over the components; 0 without components.
    pub fn available(&self) -> u64 {
        available_units(&self.components, |id| self.stock.get(id).copied())
    }
}

#[derive(Debug, Clone)]
pub struct AvailabilityCalculator<S> {
    store: S,
    ledger: ArticleLedger<S>,
    catalog: ProductCatalog<S>,
}

impl<S> AvailabilityCalculator<S>
where
    S: InventoryStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            ledger: ArticleLedger::new(store.clone()),
            catalog: ProductCatalog::new(store.clone()),
            store,
        }
    }

    /// Units of `name` assemblable right now, from one consistent snapshot.
    #[instrument(skip(self, name), fields(product = %name), err)]
    pub async fn availability_of(&self, name: &ProductName) -> InventoryResult<u64> {
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let view = self.availability_in(&mut tx, name).await?;
        tx.commit().await?;
        Ok(view.available())
    }

    /// Read the components of `name` and their stock inside `tx`.
    ///
    /// In a `ReadWrite` transaction the component rows stay locked until `tx` ends.
    pub async fn availability_in(
        &self,
        tx: &mut S::Tx,
        name: &ProductName,
    ) -> InventoryResult<StockView> {
        let components = self.catalog.components_of(tx, name).await?;
        let art_ids: Vec<ArticleId> = components.iter().map(|c| c.art_id().clone()).collect();
        let stock = self.ledger.stock_in(tx, &art_ids).await?;
        Ok(StockView { components, stock })
    }

    /// Every product with at least one assemblable unit, ordered by name.
    #[instrument(skip(self), err)]
    pub async fn all_availabilities(&self) -> InventoryResult<Vec<ProductAvailability>> {
        let mut tx = self.store.begin(TxMode::ReadOnly).await?;
        let catalog = self.catalog.all_in(&mut tx).await?;
        let art_ids: Vec<ArticleId> = catalog
            .values()
            .flatten()
            .map(|c| c.art_id().clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let stock = self.ledger.stock_in(&mut tx, &art_ids).await?;
        tx.commit().await?;
        Ok(availability_report(&catalog, &stock))
    }
}
