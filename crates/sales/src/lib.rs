//! Sales domain module.
//!
//! The per-request sale state machine and the decrement plan it produces.
//! Deterministic domain logic only; the transaction that feeds it facts and
//! applies its plan lives in `warehouse-infra`.

pub mod sale;

pub use sale::{Decrement, Sale, SaleState};
