use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use newsent_store::RequestCounter;
use uuid::Uuid;

/// Paths that are served without advancing the request counter.
const UNCOUNTED_PATHS: &[&str] = &["/api/request-count", "/api/v1/health"];

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware advancing the shared request counter before the handler runs.
///
/// Counter failures never fail the request; they are logged and skipped.
pub async fn count_requests(
    State(counter): State<Arc<RequestCounter>>,
    req: Request,
    next: Next,
) -> Response {
    if !is_uncounted(req.uri().path()) {
        match counter.increment().await {
            Ok(count) => {
                tracing::debug!(
                    count,
                    method = %req.method(),
                    path = %req.uri().path(),
                    "api request"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "request counter unavailable");
            }
        }
    }

    next.run(req).await
}

fn is_uncounted(path: &str) -> bool {
    UNCOUNTED_PATHS.contains(&path)
}
