//! Storage boundary for articles and the product catalog.
//!
//! The engine components only ever talk to [`InventoryStore`] and
//! [`StockTransaction`]; which backend sits behind them is decided at startup.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryInventoryStore, InMemoryTransaction};
pub use postgres::{PostgresInventoryStore, PostgresTransaction};
pub use r#trait::{InventoryStore, StockTransaction, StoreError, TxMode};
