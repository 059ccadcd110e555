use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use warehouse_core::Deadline;

use crate::context::{RequestDeadline, RequestId};

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Attach a [`RequestId`] to the request and echo it on the response.
pub async fn request_id_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let rid = inbound_request_id(req.headers())
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    req.extensions_mut().insert(RequestId::new(rid.clone()));
    let mut res = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&rid) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

/// Stamp the request with a deadline `timeout` from now.
pub async fn deadline_middleware(
    State(timeout): State<Duration>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    req.extensions_mut()
        .insert(RequestDeadline::new(Deadline::after(timeout)));
    next.run(req).await
}

fn inbound_request_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}
