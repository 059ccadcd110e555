//! Availability: how many units of a product current stock can assemble.
//!
//! `available(P) = min_i floor(stock(a_i) / q_i)`. An article missing from the
//! ledger counts as zero stock, and a product without components is never
//! available.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use warehouse_core::{ArticleId, ProductName};

use crate::product::Component;

/// Derived (never stored) availability of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAvailability {
    pub name: ProductName,
    pub available: u64,
}

/// Units of a product assemblable from the stock visible through `stock_of`.
pub fn available_units<F>(components: &[Component], stock_of: F) -> u64
where
    F: Fn(&ArticleId) -> Option<u64>,
{
    components
        .iter()
        .map(|c| stock_of(c.art_id()).unwrap_or(0) / c.amount_required())
        .min()
        .unwrap_or(0)
}

/// Availability of every product in `catalog`, zero entries dropped, ordered by name.
pub fn availability_report(
    catalog: &BTreeMap<ProductName, Vec<Component>>,
    stock: &BTreeMap<ArticleId, u64>,
) -> Vec<ProductAvailability> {
    catalog
        .iter()
        .filter_map(|(name, components)| {
            let available = available_units(components, |id| stock.get(id).copied());
            (available > 0).then(|| ProductAvailability {
                name: name.clone(),
                available,
            })
        })
        .collect()
}
