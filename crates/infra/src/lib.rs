//! Stock-commitment engine.
//!
//! Composes the pure domain crates with a storage backend:
//!
//! - [`store`]: the storage boundary and its in-memory and Postgres backends
//! - [`ledger`], [`catalog`]: article quantities and bills of materials
//! - [`availability`]: assemblable units per product
//! - [`sale_committer`]: all-or-nothing sales
//! - [`facade`]: the capability set handed to adapters

pub mod availability;
pub mod catalog;
pub mod facade;
pub mod ledger;
pub mod sale_committer;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use availability::{AvailabilityCalculator, StockView};
pub use catalog::ProductCatalog;
pub use facade::InventoryFacade;
pub use ledger::ArticleLedger;
pub use sale_committer::SaleCommitter;
pub use store::{
    InMemoryInventoryStore, InventoryStore, PostgresInventoryStore, StockTransaction, StoreError,
    TxMode,
};
