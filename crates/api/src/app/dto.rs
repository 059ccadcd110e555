use serde::{Deserialize, Serialize};

use warehouse_inventory::{Article, NewArticle};
use warehouse_products::{NewComponent, NewProduct, ProductAvailability};

// -------------------------
// Request DTOs
// -------------------------

/// A count sent either as a JSON string (`"12"`) or a JSON integer (`12`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Quantity {
    Text(String),
    Number(i64),
}

impl Quantity {
    pub fn into_text(self) -> String {
        match self {
            Quantity::Text(s) => s,
            Quantity::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadInventoryRequest {
    pub inventory: Vec<StockRequest>,
}

#[derive(Debug, Deserialize)]
pub struct StockRequest {
    pub art_id: String,
    pub name: String,
    pub stock: Quantity,
}

impl From<StockRequest> for NewArticle {
    fn from(value: StockRequest) -> Self {
        NewArticle {
            art_id: value.art_id,
            name: value.name,
            stock: value.stock.into_text(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadProductsRequest {
    pub products: Vec<ProductRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    #[serde(default)]
    pub contain_articles: Vec<ContainArticleRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ContainArticleRequest {
    pub art_id: String,
    pub amount_of: Quantity,
}

impl From<ProductRequest> for NewProduct {
    fn from(value: ProductRequest) -> Self {
        NewProduct {
            name: value.name,
            components: value
                .contain_articles
                .into_iter()
                .map(|c| NewComponent {
                    art_id: c.art_id,
                    amount_required: c.amount_of.into_text(),
                })
                .collect(),
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Stock travels as text, the same way it is uploaded.
#[derive(Debug, Serialize)]
pub struct StockResponse {
    pub art_id: String,
    pub name: String,
    pub stock: String,
}

impl From<&Article> for StockResponse {
    fn from(value: &Article) -> Self {
        Self {
            art_id: value.art_id().to_string(),
            name: value.name().to_string(),
            stock: value.stock().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InventoryResponse {
    pub inventory: Vec<StockResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProductStockResponse {
    pub product_name: String,
    pub stock_of_product: String,
}

impl From<&ProductAvailability> for ProductStockResponse {
    fn from(value: &ProductAvailability) -> Self {
        Self {
            product_name: value.name.to_string(),
            stock_of_product: value.available.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductStocksResponse {
    pub product_stocks: Vec<ProductStockResponse>,
}
