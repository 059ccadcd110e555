//! Product catalog domain module.
//!
//! Bills of materials (which articles a product consumes, and how many of
//! each) and the availability formula derived from them. Pure logic only.

pub mod availability;
pub mod product;

pub use availability::{ProductAvailability, availability_report, available_units};
pub use product::{Component, NewComponent, NewProduct, Product};
