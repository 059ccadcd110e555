use serde::{Deserialize, Serialize};

use warehouse_core::{ArticleId, InventoryError, InventoryResult, parse_quantity};

/// A raw stock-keeping unit and its on-hand count.
///
/// Articles are created by bulk upload and afterwards only ever lose stock
/// through committed sales; they are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    art_id: ArticleId,
    name: String,
    stock: u64,
}

impl Article {
    pub fn new(art_id: ArticleId, name: impl Into<String>, stock: u64) -> InventoryResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(InventoryError::validation(format!(
                "article '{art_id}' name cannot be empty"
            )));
        }
        Ok(Self { art_id, name, stock })
    }

    /// Build an article from its upload representation (stock as text).
    pub fn parse(art_id: &str, name: &str, stock: &str) -> InventoryResult<Self> {
        let art_id = ArticleId::new(art_id)?;
        let stock = parse_quantity(&format!("stock of article '{art_id}'"), stock)?;
        Self::new(art_id, name, stock)
    }

    pub fn art_id(&self) -> &ArticleId {
        &self.art_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stock(&self) -> u64 {
        self.stock
    }
}

/// Upload representation of an article; `stock` is still text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewArticle {
    pub art_id: String,
    pub name: String,
    pub stock: String,
}

impl NewArticle {
    pub fn validate(&self) -> InventoryResult<Article> {
        Article::parse(&self.art_id, &self.name, &self.stock)
    }
}
