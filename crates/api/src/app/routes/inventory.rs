use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{debug, warn};

use crate::app::{dto, errors, services::AppServices};
use crate::context::{RequestDeadline, RequestId};

pub fn router() -> Router {
    Router::new().route("/", get(list_inventory).post(upload_inventory))
}

pub async fn list_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(rid): Extension<RequestId>,
    Extension(deadline): Extension<RequestDeadline>,
) -> axum::response::Response {
    debug!(rid = %rid, "list inventory");
    match services.list_articles(deadline.deadline()).await {
        Ok(articles) => Json(dto::InventoryResponse {
            inventory: articles.iter().map(dto::StockResponse::from).collect(),
        })
        .into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}

pub async fn upload_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(rid): Extension<RequestId>,
    Extension(deadline): Extension<RequestDeadline>,
    body: Result<Json<dto::UploadInventoryRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            warn!(rid = %rid, err = %rejection, "malformed inventory upload");
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "malformed_request",
                rejection.body_text(),
            );
        }
    };
    debug!(rid = %rid, count = body.inventory.len(), "upload inventory");

    let articles = body.inventory.into_iter().map(Into::into).collect();
    match services.upload_articles(articles, deadline.deadline()).await {
        Ok(n) => Json(dto::MessageResponse::new(format!("{n} item inserted"))).into_response(),
        Err(e) => errors::inventory_error_to_response(e),
    }
}
