use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, AppState};

/// Bare `{ "count": n }`, matching the persisted shape.
#[derive(Debug, Serialize)]
pub(super) struct RequestCountBody {
    pub count: u64,
}

pub(super) async fn get_request_count(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<RequestCountBody>, ApiError> {
    let count = state.counter.current().await.map_err(|e| {
        tracing::error!(error = %e, "request counter unavailable");
        ApiError::new(req_id.0, "internal_error", "request counter unavailable")
    })?;

    Ok(Json(RequestCountBody { count }))
}
