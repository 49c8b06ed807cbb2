use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use newsent_core::Category;
use newsent_sentiment::{
    filter_by_sentiment, ArticleRecord, CategoryReport, Sentiment, SentimentSummary, TrendSeries,
};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_query_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct RecordsQuery {
    /// `positive`, `neutral`, `negative`, or `all`.
    pub sentiment: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CategorySummaryData {
    pub category: Category,
    pub summary: SentimentSummary,
    pub trend_series: TrendSeries,
}

fn parse_filter(raw: Option<&str>) -> Result<Option<Sentiment>, String> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if raw.eq_ignore_ascii_case("all") {
        return Ok(None);
    }
    match Sentiment::from_label(raw) {
        Sentiment::Unrecognized => Err(format!(
            "unknown sentiment filter '{raw}'; expected positive, neutral, negative or all"
        )),
        sentiment => Ok(Some(sentiment)),
    }
}

/// Raw record array in the shape the dashboard has always consumed.
pub(super) async fn list_records(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<Vec<ArticleRecord>>, ApiError> {
    let filter = parse_filter(query.sentiment.as_deref())
        .map_err(|message| ApiError::new(req_id.0.clone(), "bad_request", message))?;

    let (_, records) = state
        .sentiment
        .records(&category)
        .await
        .map_err(|e| map_query_error(req_id.0.clone(), &e))?;

    let records = match filter {
        Some(sentiment) => filter_by_sentiment(&records, sentiment),
        None => records,
    };

    Ok(Json(records))
}

pub(super) async fn get_category_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<CategoryReport>>, ApiError> {
    let report = state
        .sentiment
        .query(&category)
        .await
        .map_err(|e| map_query_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_category_summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
) -> Result<Json<ApiResponse<CategorySummaryData>>, ApiError> {
    let report = state
        .sentiment
        .query(&category)
        .await
        .map_err(|e| map_query_error(req_id.0.clone(), &e))?;

    let trend_series = report.summary.trend_series();
    Ok(Json(ApiResponse {
        data: CategorySummaryData {
            category: report.category,
            summary: report.summary,
            trend_series,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_categories(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<Category>>> {
    Json(ApiResponse {
        data: state.sentiment.categories().to_vec(),
        meta: ResponseMeta::new(req_id.0),
    })
}
