use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, info, warn};

use crate::app::{dto, errors, services::AppServices};
use crate::context::{RequestDeadline, RequestId};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_product_stock).post(upload_products))
        .route("/:product_name", post(sell_product))
}

pub async fn list_product_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(rid): Extension<RequestId>,
    Extension(deadline): Extension<RequestDeadline>,
) -> axum::response::Response {
    debug!(rid = %rid, "list product stock");
    match services.list_available_products(deadline.deadline()).await {
        Ok(stocks) if stocks.is_empty() => {
            Json(dto::MessageResponse::new("No product in stock")).into_response()
        }
        Ok(stocks) => Json(dto::ProductStocksResponse {
            product_stocks: stocks.iter().map(dto::ProductStockResponse::from).collect(),
        })
        .into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn upload_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(rid): Extension<RequestId>,
    Extension(deadline): Extension<RequestDeadline>,
    body: Result<Json<dto::UploadProductsRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            warn!(rid = %rid, err = %rejection, "malformed product upload");
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "malformed_request",
                rejection.body_text(),
            );
        }
    };
    debug!(rid = %rid, count = body.products.len(), "upload products");

    let products = body.products.into_iter().map(Into::into).collect();
    match services.upload_products(products, deadline.deadline()).await {
        Ok(n) => Json(dto::MessageResponse::new(format!("{n} product inserted"))).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn sell_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(rid): Extension<RequestId>,
    Extension(deadline): Extension<RequestDeadline>,
    Path(product_name): Path<String>,
) -> axum::response::Response {
    debug!(rid = %rid, product = %product_name, "sell product");
    match services.sell(&product_name, deadline.deadline()).await {
        Ok(()) => {
            info!(rid = %rid, product = %product_name, "product sold");
            Json(dto::MessageResponse::new(format!(
                "Product {product_name} is sold and inventory is updated accordingly"
            )))
            .into_response()
        }
        Err(e) => {
            debug!(rid = %rid, product = %product_name, kind = %e.kind(), "sale rejected");
            errors::inventory_error_to_response(e)
        }
    }
}
