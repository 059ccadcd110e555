//! Single entry point the adapters talk to.
//!
//! Every call takes a [`Deadline`]. A deadline that has already passed fails
//! with `Timeout` before any storage work starts; one that passes mid-flight
//! drops the in-progress future, and with it the open transaction, which
//! rolls back.

use std::future::Future;

use tracing::{instrument, warn};

use warehouse_core::{Deadline, InventoryError, InventoryResult, ProductName};
use warehouse_inventory::{Article, NewArticle};
use warehouse_products::{NewProduct, Product, ProductAvailability};

use crate::availability::AvailabilityCalculator;
use crate::catalog::ProductCatalog;
use crate::ledger::ArticleLedger;
use crate::sale_committer::SaleCommitter;
use crate::store::InventoryStore;

#[derive(Debug, Clone)]
pub struct InventoryFacade<S> {
    store: S,
    ledger: ArticleLedger<S>,
    catalog: ProductCatalog<S>,
    availability: AvailabilityCalculator<S>,
    committer: SaleCommitter<S>,
}

impl<S> InventoryFacade<S>
where
    S: InventoryStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            ledger: ArticleLedger::new(store.clone()),
            catalog: ProductCatalog::new(store.clone()),
            availability: AvailabilityCalculator::new(store.clone()),
            committer: SaleCommitter::new(store.clone()),
            store,
        }
    }

    /// Liveness of the underlying storage.
    pub async fn ping(&self, deadline: Deadline) -> InventoryResult<()> {
        within(deadline, "ping", async {
            self.store.ping().await?;
            Ok(())
        })
        .await
    }

    pub async fn list_articles(&self, deadline: Deadline) -> InventoryResult<Vec<Article>> {
        within(deadline, "list_articles", self.ledger.list_all()).await
    }

    /// Products with at least one assemblable unit, ordered by name.
    pub async fn list_available_products(
        &self,
        deadline: Deadline,
    ) -> InventoryResult<Vec<ProductAvailability>> {
        within(
            deadline,
            "list_available_products",
            self.availability.all_availabilities(),
        )
        .await
    }

    /// Validate the whole batch, then insert it atomically. Returns the number inserted.
    #[instrument(skip(self, articles, deadline), fields(count = articles.len()), err)]
    pub async fn upload_articles(
        &self,
        articles: Vec<NewArticle>,
        deadline: Deadline,
    ) -> InventoryResult<u64> {
        let articles = articles
            .iter()
            .map(NewArticle::validate)
            .collect::<InventoryResult<Vec<Article>>>()?;
        within(deadline, "upload_articles", self.ledger.bulk_insert(articles)).await
    }

    /// Validate the whole batch, then catalogue it atomically. Returns the number of products.
    #[instrument(skip(self, products, deadline), fields(count = products.len()), err)]
    pub async fn upload_products(
        &self,
        products: Vec<NewProduct>,
        deadline: Deadline,
    ) -> InventoryResult<u64> {
        let products = products
            .iter()
            .map(NewProduct::validate)
            .collect::<InventoryResult<Vec<Product>>>()?;
        within(deadline, "upload_products", self.catalog.bulk_insert(products)).await
    }

    /// Sell one unit of `product`.
    ///
    /// A blank name cannot be catalogued, so it is reported like any other
    /// unknown product.
    pub async fn sell(&self, product: &str, deadline: Deadline) -> InventoryResult<()> {
        let name = ProductName::new(product).map_err(|_| InventoryError::product_not_in_system())?;
        within(deadline, "sell", self.committer.sell(&name)).await
    }
}

async fn within<T, F>(deadline: Deadline, operation: &'static str, work: F) -> InventoryResult<T>
where
    F: Future<Output = InventoryResult<T>>,
{
    // `timeout_at` polls the work once before looking at the clock.
    if deadline.has_elapsed() {
        warn!(operation, "deadline elapsed before start");
        return Err(InventoryError::timeout(format!(
            "{operation} was not started before its deadline"
        )));
    }

    let at = tokio::time::Instant::from_std(deadline.instant());
    match tokio::time::timeout_at(at, work).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, "deadline elapsed; transaction rolled back");
            Err(InventoryError::timeout(format!(
                "{operation} did not complete before its deadline"
            )))
        }
    }
}
