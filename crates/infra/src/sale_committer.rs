//! Sale committer: validates and applies one sale inside a single row-locking transaction.
//!
//! ```text
//! START → VALIDATE_EXISTS → VALIDATE_STOCK → APPLY → COMMITTED
//!               ↓                 ↓            ↓
//!           ABORTED(not_found) ABORTED(out_of_stock) ABORTED(conflict)
//! ```
//!
//! The stock read in `VALIDATE_STOCK` locks every component row, so no other
//! sale touching those articles can commit between the check and the decrement.
//! Any early return drops the transaction, which rolls it back.

use tracing::{debug, info, instrument};

use warehouse_core::{InventoryError, InventoryResult, ProductName};
use warehouse_sales::Sale;

use crate::availability::AvailabilityCalculator;
use crate::catalog::ProductCatalog;
use crate::ledger::ArticleLedger;
use crate::store::{InventoryStore, StockTransaction, TxMode};

#[derive(Debug, Clone)]
pub struct SaleCommitter<S> {
    store: S,
    ledger: ArticleLedger<S>,
    catalog: ProductCatalog<S>,
    availability: AvailabilityCalculator<S>,
}

impl<S> SaleCommitter<S>
where
    S: InventoryStore + Clone,
{
    pub fn new(store: S) -> Self {
        Self {
            ledger: ArticleLedger::new(store.clone()),
            catalog: ProductCatalog::new(store.clone()),
            availability: AvailabilityCalculator::new(store.clone()),
            store,
        }
    }

    /// Commit one unit of `name`, or nothing at all.
    #[instrument(skip(self, name), fields(product = %name), err)]
    pub async fn sell(&self, name: &ProductName) -> InventoryResult<()> {
        let mut sale = Sale::new(name.clone());
        sale.begin()?;
        log_transition(&sale);

        let mut tx = self
            .store
            .begin(TxMode::ReadWrite)
            .await
            .map_err(|e| sale.abort(e.into()))?;

        let exists = self
            .catalog
            .exists(&mut tx, name)
            .await
            .map_err(|e| sale.abort(e))?;
        let checked = sale.record_existence(exists);
        log_transition(&sale);
        checked?;

        let view = self
            .availability
            .availability_in(&mut tx, name)
            .await
            .map_err(|e| sale.abort(e))?;
        let planned = sale
            .record_stock(&view.components, &view.stock)
            .map(<[_]>::to_vec);
        log_transition(&sale);
        let plan = planned?;

        for step in &plan {
            if let Err(err) = self.ledger.decrement(&mut tx, &step.art_id, step.amount).await {
                return Err(abort_logged(&mut sale, err));
            }
        }
        if let Err(err) = tx.commit().await {
            return Err(abort_logged(&mut sale, err.into()));
        }

        sale.record_committed()?;
        log_transition(&sale);
        info!(product = %name, decrements = plan.len(), "sale committed");
        Ok(())
    }
}

fn log_transition(sale: &Sale) {
    debug!(product = %sale.product(), state = %sale.state(), "sale transition");
}

fn abort_logged(sale: &mut Sale, err: InventoryError) -> InventoryError {
    let err = sale.abort(err);
    log_transition(sale);
    err
}
