use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use warehouse_core::{ArticleId, InventoryError, InventoryResult, ProductName, parse_quantity};

/// One line of a bill of materials: `amount_required` units of `art_id` per product unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    art_id: ArticleId,
    amount_required: u64,
}

impl Component {
    pub fn new(art_id: ArticleId, amount_required: u64) -> InventoryResult<Self> {
        if amount_required == 0 {
            return Err(InventoryError::validation(format!(
                "amount of article '{art_id}' must be positive"
            )));
        }
        Ok(Self {
            art_id,
            amount_required,
        })
    }

    /// Build a component from its upload representation (amount as text).
    pub fn parse(art_id: &str, amount_of: &str) -> InventoryResult<Self> {
        let art_id = ArticleId::new(art_id)?;
        let amount = parse_quantity(&format!("amount of article '{art_id}'"), amount_of)?;
        Self::new(art_id, amount)
    }

    pub fn art_id(&self) -> &ArticleId {
        &self.art_id
    }

    pub fn amount_required(&self) -> u64 {
        self.amount_required
    }
}

/// A sellable product: a fixed recipe of articles.
///
/// Invariants (enforced by [`Product::new`]):
/// - at least one component
/// - each article appears at most once
/// - components are kept in ascending `art_id` order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    name: ProductName,
    components: Vec<Component>,
}

impl Product {
    pub fn new(name: ProductName, mut components: Vec<Component>) -> InventoryResult<Self> {
        if components.is_empty() {
            return Err(InventoryError::validation(format!(
                "product '{name}' must contain at least one article"
            )));
        }

        let mut seen = BTreeSet::new();
        for c in &components {
            if !seen.insert(c.art_id()) {
                return Err(InventoryError::validation(format!(
                    "product '{name}' lists article '{}' more than once",
                    c.art_id()
                )));
            }
        }

        components.sort_by(|a, b| a.art_id.cmp(&b.art_id));
        Ok(Self { name, components })
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

/// Upload representation of a component; `amount_required` is still text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComponent {
    pub art_id: String,
    pub amount_required: String,
}

/// Upload representation of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub components: Vec<NewComponent>,
}

impl NewProduct {
    pub fn validate(&self) -> InventoryResult<Product> {
        let name = ProductName::new(self.name.clone())?;
        let components = self
            .components
            .iter()
            .map(|c| Component::parse(&c.art_id, &c.amount_required))
            .collect::<InventoryResult<Vec<_>>>()?;
        Product::new(name, components)
    }
}
