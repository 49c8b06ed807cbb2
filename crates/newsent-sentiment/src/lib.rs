//! Sentiment aggregation for classified news articles.
//!
//! Loads per-category datasets written by the offline classifier, turns them
//! into count, percentage, average-score and daily-trend summaries, and
//! exposes both through [`CategoryDataService`] for the HTTP and CLI callers.

pub mod aggregate;
pub mod error;
pub mod loader;
pub mod service;
pub mod types;

pub use aggregate::{
    filter_by_sentiment, summarize, summarize_as_of, SentimentCounts, SentimentPercentages,
    SentimentSummary, TrendBucket, TrendSeries,
};
pub use error::{DatasetError, QueryError};
pub use loader::{parse_dataset, DatasetLoader};
pub use service::{CategoryDataService, CategoryReport};
pub use types::{ArticleRecord, Sentiment};
