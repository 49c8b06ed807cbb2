//! Per-query orchestration of loading and aggregation.

use std::sync::Arc;

use newsent_core::Category;
use serde::Serialize;

use crate::aggregate::{summarize, SentimentSummary};
use crate::error::{DatasetError, QueryError};
use crate::loader::DatasetLoader;
use crate::types::ArticleRecord;

/// Summary and raw records for one category, read in a single pass.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub category: Category,
    pub summary: SentimentSummary,
    pub records: Vec<ArticleRecord>,
}

/// Stateless query front for the dataset loader and aggregator.
///
/// Every call re-reads the backing file; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct CategoryDataService {
    loader: Arc<DatasetLoader>,
}

impl CategoryDataService {
    #[must_use]
    pub fn new(loader: DatasetLoader) -> Self {
        Self {
            loader: Arc::new(loader),
        }
    }

    #[must_use]
    pub fn loader(&self) -> &DatasetLoader {
        &self.loader
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        self.loader.categories()
    }

    /// Load `label`'s dataset and summarize it.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::NotFound`] for unknown categories or missing
    /// files, and [`QueryError::Internal`] for malformed or unreadable data.
    pub async fn query(&self, label: &str) -> Result<CategoryReport, QueryError> {
        let (category, records) = self.records(label).await?;
        let summary = summarize(&records);
        tracing::info!(
            category = %category,
            records = summary.total_records,
            positive = summary.counts.positive,
            neutral = summary.counts.neutral,
            negative = summary.counts.negative,
            "category summarized"
        );
        Ok(CategoryReport {
            category,
            summary,
            records,
        })
    }

    /// Load `label`'s raw records without aggregating them.
    ///
    /// # Errors
    ///
    /// Same failure mapping as [`CategoryDataService::query`].
    pub async fn records(
        &self,
        label: &str,
    ) -> Result<(Category, Vec<ArticleRecord>), QueryError> {
        let category = self.loader.resolve(label).map_err(log_failure)?;

        let loader = Arc::clone(&self.loader);
        let records = tokio::task::spawn_blocking(move || loader.load_category(category))
            .await
            .map_err(|e| {
                tracing::error!(category = %category, error = %e, "dataset load task failed");
                QueryError::Internal(format!("dataset load task failed: {e}"))
            })?
            .map_err(log_failure)?;

        Ok((category, records))
    }
}

fn log_failure(err: DatasetError) -> QueryError {
    match &err {
        DatasetError::NotFound { category } => {
            tracing::debug!(category = %category, "category not found");
        }
        DatasetError::Parse { .. } | DatasetError::Io { .. } => {
            tracing::error!(error = %err, "dataset load failed");
        }
    }
    QueryError::from(err)
}
