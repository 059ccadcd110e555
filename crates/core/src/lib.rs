//! `warehouse-core`: shared building blocks for the warehouse workspace.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod deadline;
pub mod error;
pub mod id;
pub mod quantity;

pub use deadline::Deadline;
pub use error::{ErrorKind, InventoryError, InventoryResult};
pub use id::{ArticleId, ProductName};
pub use quantity::parse_quantity;
