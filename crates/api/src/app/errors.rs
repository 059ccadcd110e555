use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use warehouse_core::{ErrorKind, InventoryError};

/// Transport status for each engine error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::OutOfStock | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::ValidationError => StatusCode::BAD_REQUEST,
        ErrorKind::PersistenceError => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
    }
}

pub fn inventory_error_to_response(err: InventoryError) -> axum::response::Response {
    let kind = err.kind();
    json_error(status_for(kind), kind.as_str(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "code": status.as_u16(),
            "message": message.into(),
            "errors": code,
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_outcomes_map_to_distinct_statuses() {
        let not_found = inventory_error_to_response(InventoryError::product_not_in_system());
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let out_of_stock = inventory_error_to_response(InventoryError::product_not_in_stock());
        assert_eq!(out_of_stock.status(), StatusCode::CONFLICT);

        let timeout = inventory_error_to_response(InventoryError::timeout("sell"));
        assert_eq!(timeout.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
