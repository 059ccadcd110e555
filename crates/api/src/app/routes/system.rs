use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use tracing::{debug, error};

use crate::app::{dto, errors, services::AppServices};
use crate::context::{RequestDeadline, RequestId};

pub async fn health(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(rid): Extension<RequestId>,
    Extension(deadline): Extension<RequestDeadline>,
) -> axum::response::Response {
    debug!(rid = %rid, "health");
    match services.ping(deadline.deadline()).await {
        Ok(()) => (StatusCode::OK, Json(dto::MessageResponse::new("healthy endpoint"))).into_response(),
        Err(e) => {
            error!(rid = %rid, err = %e, "health ping failed");
            errors::json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                e.kind().as_str(),
                "unhealthy endpoint",
            )
        }
    }
}
