use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use warehouse_core::{ArticleId, ErrorKind, InventoryError, InventoryResult, ProductName};
use warehouse_products::{Component, available_units};

/// Lifecycle of a single sale request.
///
/// ```text
/// START → VALIDATE_EXISTS → VALIDATE_STOCK → APPLY → COMMITTED
///               ↓                 ↓            ↓
///            ABORTED           ABORTED      ABORTED
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleState {
    Start,
    ValidateExists,
    ValidateStock,
    Apply,
    Committed,
    Aborted(ErrorKind),
}

impl SaleState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SaleState::Committed | SaleState::Aborted(_))
    }
}

impl core::fmt::Display for SaleState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SaleState::Start => f.write_str("START"),
            SaleState::ValidateExists => f.write_str("VALIDATE_EXISTS"),
            SaleState::ValidateStock => f.write_str("VALIDATE_STOCK"),
            SaleState::Apply => f.write_str("APPLY"),
            SaleState::Committed => f.write_str("COMMITTED"),
            SaleState::Aborted(kind) => write!(f, "ABORTED({kind})"),
        }
    }
}

/// Stock to take from one article when a sale is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decrement {
    pub art_id: ArticleId,
    pub amount: u64,
}

/// One sale of one unit of a product.
///
/// The sale does no IO: the caller feeds it facts read inside its transaction
/// (does the product exist, what are its components, how much stock is there)
/// and the sale decides. Every fact must come from the same transaction that
/// later applies the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sale {
    product: ProductName,
    state: SaleState,
    plan: Vec<Decrement>,
}

impl Sale {
    pub fn new(product: ProductName) -> Self {
        Self {
            product,
            state: SaleState::Start,
            plan: Vec::new(),
        }
    }

    pub fn product(&self) -> &ProductName {
        &self.product
    }

    pub fn state(&self) -> SaleState {
        self.state
    }

    /// Decrements to apply; empty until the stock check has passed.
    pub fn plan(&self) -> &[Decrement] {
        &self.plan
    }

    /// `START → VALIDATE_EXISTS`.
    pub fn begin(&mut self) -> InventoryResult<()> {
        self.expect_state(SaleState::Start, "begin")?;
        self.state = SaleState::ValidateExists;
        Ok(())
    }

    /// Leaves `VALIDATE_EXISTS`: aborts with `NotFound` unless the product is catalogued.
    pub fn record_existence(&mut self, exists: bool) -> InventoryResult<()> {
        self.expect_state(SaleState::ValidateExists, "check existence")?;
        if !exists {
            return Err(self.abort(InventoryError::product_not_in_system()));
        }
        self.state = SaleState::ValidateStock;
        Ok(())
    }

    /// Leaves `VALIDATE_STOCK`: aborts with `OutOfStock` when no unit can be
    /// assembled, otherwise plans one decrement per component and enters `APPLY`.
    pub fn record_stock(
        &mut self,
        components: &[Component],
        stock: &BTreeMap<ArticleId, u64>,
    ) -> InventoryResult<&[Decrement]> {
        self.expect_state(SaleState::ValidateStock, "check stock")?;

        let available = available_units(components, |id| stock.get(id).copied());
        if available == 0 {
            return Err(self.abort(InventoryError::product_not_in_stock()));
        }

        self.plan = components
            .iter()
            .map(|c| Decrement {
                art_id: c.art_id().clone(),
                amount: c.amount_required(),
            })
            .collect();
        self.state = SaleState::Apply;
        Ok(&self.plan)
    }

    /// `APPLY → COMMITTED`, once every decrement is durable.
    pub fn record_committed(&mut self) -> InventoryResult<()> {
        self.expect_state(SaleState::Apply, "commit")?;
        self.state = SaleState::Committed;
        Ok(())
    }

    /// Move to `ABORTED` with the kind of `err`, handing the error back.
    pub fn abort(&mut self, err: InventoryError) -> InventoryError {
        if !self.state.is_terminal() {
            self.state = SaleState::Aborted(err.kind());
        }
        err
    }

    fn expect_state(&self, expected: SaleState, action: &str) -> InventoryResult<()> {
        if self.state != expected {
            return Err(InventoryError::conflict(format!(
                "sale of '{}' cannot {action} in state {}",
                self.product, self.state
            )));
        }
        Ok(())
    }
}
