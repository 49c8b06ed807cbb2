use newsent_core::Category;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    /// Unknown or disabled category, or no backing file for it.
    #[error("no dataset for category '{category}'")]
    NotFound { category: String },

    /// A row failed schema validation. `row` is 1-based over data rows;
    /// 0 refers to the header.
    #[error("malformed {category} dataset at row {row}: {reason}")]
    Parse {
        category: Category,
        row: usize,
        reason: String,
    },

    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure returned by [`crate::CategoryDataService`].
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no sentiment data for category '{category}'")]
    NotFound { category: String },

    #[error("sentiment data unavailable: {0}")]
    Internal(String),
}

impl QueryError {
    /// Stable machine-readable code for API error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::NotFound { .. } => "not_found",
            QueryError::Internal(_) => "internal_error",
        }
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            QueryError::NotFound { .. } => 404,
            QueryError::Internal(_) => 500,
        }
    }
}

impl From<DatasetError> for QueryError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::NotFound { category } => QueryError::NotFound { category },
            other @ (DatasetError::Parse { .. } | DatasetError::Io { .. }) => {
                QueryError::Internal(other.to_string())
            }
        }
    }
}
