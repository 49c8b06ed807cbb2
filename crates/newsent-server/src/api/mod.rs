mod counter;
mod sentiment;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use newsent_core::AppConfig;
use newsent_sentiment::{CategoryDataService, DatasetLoader, QueryError};
use newsent_store::RequestCounter;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{count_requests, request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub sentiment: CategoryDataService,
    pub counter: Arc<RequestCounter>,
}

impl AppState {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            sentiment: CategoryDataService::new(DatasetLoader::new(
                config.data_dir.clone(),
                &config.categories,
            )),
            counter: Arc::new(RequestCounter::new(config.counter_path.clone())),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Internal failures keep their detail in the log, not the response body.
pub(super) fn map_query_error(request_id: String, error: &QueryError) -> ApiError {
    match error {
        QueryError::NotFound { category } => ApiError::new(
            request_id,
            error.code(),
            format!("no sentiment data for category '{category}'"),
        ),
        QueryError::Internal(_) => {
            tracing::error!(error = %error, "sentiment query failed");
            ApiError::new(request_id, error.code(), "sentiment data unavailable")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, HeaderName::from_static("x-request-id")])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/categories", get(sentiment::list_categories))
        .route("/api/sentiment/{category}", get(sentiment::list_records))
        .route(
            "/api/v1/sentiment/{category}",
            get(sentiment::get_category_report),
        )
        .route(
            "/api/v1/sentiment/{category}/summary",
            get(sentiment::get_category_summary),
        )
        .route("/api/request-count", get(counter::get_request_count))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state.counter),
            count_requests,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    Json(ApiResponse {
        data: HealthData { status: "ok" },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use newsent_core::Category;
    use tower::ServiceExt;

    use super::*;

    const POLITICS_CSV: &str = "\
Title,Description,URL,PublishedAt,Predicted_Sentiment
Budget passes,Vote count,https://example.com/1,2025-02-10T10:00:00Z,Positive
Minister resigns,Scandal,https://example.com/2,2025-02-09T08:00:00Z,negative
Debate scheduled,,https://example.com/3,2025-02-09T12:00:00Z,neutral
Poll results,Close race,https://example.com/4,2025-02-10T20:00:00Z,POSITIVE
";

    fn test_state(dir: &Path) -> AppState {
        std::fs::write(dir.join("news_politics_predicted.csv"), POLITICS_CSV)
            .expect("write dataset");
        AppState {
            sentiment: CategoryDataService::new(DatasetLoader::new(dir, &Category::ALL)),
            counter: Arc::new(RequestCounter::new(dir.join("request_count.json"))),
        }
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    #[test]
    fn api_error_not_found_maps_to_404() {
        let response = ApiError::new("req-1", "not_found", "missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_unknown_code_maps_to_500() {
        let response = ApiError::new("req-1", "internal_error", "boom").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, json) = get_json(build_app(test_state(dir.path())), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn records_endpoint_uses_dashboard_field_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, json) =
            get_json(build_app(test_state(dir.path())), "/api/sentiment/politics").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().expect("array body");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["Title"], "Budget passes");
        assert_eq!(rows[0]["URL"], "https://example.com/1");
        assert_eq!(rows[0]["Predicted_Sentiment"], "Positive");
        assert_eq!(rows[0]["PublishedAt"], "2025-02-10T10:00:00Z");
        assert!(rows[2]["Description"].is_null());
    }

    #[tokio::test]
    async fn records_endpoint_filters_by_sentiment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, json) = get_json(
            build_app(test_state(dir.path())),
            "/api/sentiment/politics?sentiment=positive",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().expect("array body");
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r["Predicted_Sentiment"] == "Positive"));
    }

    #[tokio::test]
    async fn records_endpoint_rejects_unknown_filter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, json) = get_json(
            build_app(test_state(dir.path())),
            "/api/sentiment/politics?sentiment=angry",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn unknown_category_returns_404() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, json) =
            get_json(build_app(test_state(dir.path())), "/api/sentiment/finance").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn malformed_dataset_returns_500_without_detail() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        std::fs::write(
            dir.path().join("news_health_predicted.csv"),
            "Title,Predicted_Sentiment\n,positive\n",
        )
        .expect("write dataset");
        let (status, json) = get_json(build_app(state), "/api/v1/sentiment/health").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["code"], "internal_error");
        assert_eq!(json["error"]["message"], "sentiment data unavailable");
    }

    #[tokio::test]
    async fn summary_endpoint_returns_statistics() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, json) = get_json(
            build_app(test_state(dir.path())),
            "/api/v1/sentiment/politics/summary",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = &json["data"];
        assert_eq!(data["category"], "politics");
        assert_eq!(data["summary"]["counts"]["positive"], 2);
        assert_eq!(data["summary"]["counts"]["neutral"], 1);
        assert_eq!(data["summary"]["counts"]["negative"], 1);
        assert_eq!(data["summary"]["percentages"]["positive"], 50.0);
        assert_eq!(data["summary"]["average_score"], 0.25);
        assert_eq!(
            data["trend_series"]["labels"],
            serde_json::json!(["2025-02-09", "2025-02-10"])
        );
        assert_eq!(data["trend_series"]["positive"], serde_json::json!([0, 2]));
        assert_eq!(data["summary"]["trend"][0]["date"], "2025-02-09");
    }

    #[tokio::test]
    async fn report_endpoint_includes_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, json) =
            get_json(build_app(test_state(dir.path())), "/api/v1/sentiment/politics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["records"].as_array().map(Vec::len), Some(4));
        assert_eq!(json["data"]["summary"]["total_records"], 4);
    }

    #[tokio::test]
    async fn categories_endpoint_lists_enabled_categories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (status, json) =
            get_json(build_app(test_state(dir.path())), "/api/v1/categories").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(8));
        assert_eq!(json["data"][0], "business");
    }

    #[tokio::test]
    async fn data_requests_advance_counter_but_count_reads_do_not() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = build_app(test_state(dir.path()));

        get_json(app.clone(), "/api/sentiment/politics").await;
        get_json(app.clone(), "/api/sentiment/finance").await;
        get_json(app.clone(), "/api/v1/health").await;

        let (status, json) = get_json(app.clone(), "/api/request-count").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["count"], 2);

        let (_, json) = get_json(app, "/api/request-count").await;
        assert_eq!(json["count"], 2);

        let persisted = newsent_store::read_persisted_count(&dir.path().join("request_count.json"))
            .expect("read counter");
        assert_eq!(persisted, 2);
    }

    #[tokio::test]
    async fn unmatched_paths_advance_counter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let app = build_app(test_state(dir.path()));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/no-such-route")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let (_, json) = get_json(app, "/api/request-count").await;
        assert_eq!(json["count"], 1);
    }
}
