//! Article domain module.
//!
//! Raw stock-keeping units and their on-hand counts, as pure validated values
//! (no IO, no HTTP, no storage).

pub mod article;

pub use article::{Article, NewArticle};
