//! Inventory error model.
//!
//! Every failure that leaves the engine is one of a small set of classified
//! kinds. Adapters map the kind to a transport status and show the message to
//! the user; they never inspect anything else.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the engine.
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Classification of an [`InventoryError`], stable across layers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    OutOfStock,
    Conflict,
    ValidationError,
    PersistenceError,
    Timeout,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::OutOfStock => "out_of_stock",
            ErrorKind::Conflict => "conflict",
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::PersistenceError => "persistence_error",
            ErrorKind::Timeout => "timeout",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine-level error.
///
/// `NotFound` and `OutOfStock` are ordinary sale outcomes, not crashes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// A referenced product or article does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A sale was requested but zero units can be assembled.
    #[error("{0}")]
    OutOfStock(String),

    /// A concurrent modification invalidated a validated read.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A bulk-upload payload was malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Storage was unavailable or rejected a write.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// The request deadline elapsed before the operation completed.
    #[error("deadline exceeded: {0}")]
    Timeout(String),
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::NotFound(_) => ErrorKind::NotFound,
            InventoryError::OutOfStock(_) => ErrorKind::OutOfStock,
            InventoryError::Conflict(_) => ErrorKind::Conflict,
            InventoryError::Validation(_) => ErrorKind::ValidationError,
            InventoryError::Persistence(_) => ErrorKind::PersistenceError,
            InventoryError::Timeout(_) => ErrorKind::Timeout,
        }
    }

    /// The product named in a sale is not in the catalog.
    pub fn product_not_in_system() -> Self {
        Self::NotFound("this product is not in system, cannot be sold".to_string())
    }

    /// The product named in a sale cannot be assembled from current stock.
    pub fn product_not_in_stock() -> Self {
        Self::OutOfStock("this product is not in stock, cannot be sold".to_string())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }
}
