//! Reads classified-article CSV datasets from the data directory.
//!
//! Each category maps to exactly one file, `news_<category>_predicted.csv`.
//! Callers name a category, never a path, so reads cannot escape the data
//! directory.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use newsent_core::Category;

use crate::error::DatasetError;
use crate::types::{ArticleRecord, Sentiment};

const TITLE: &str = "Title";
const DESCRIPTION: &str = "Description";
const URL: &str = "URL";
const PUBLISHED_AT: &[&str] = &["PublishedAt", "Published At", "publishedAt"];
const PREDICTED_SENTIMENT: &str = "Predicted_Sentiment";

/// Placeholder the upstream scraper writes for absent values.
const MISSING_PLACEHOLDER: &str = "N/A";

#[derive(Debug, Clone)]
pub struct DatasetLoader {
    data_dir: PathBuf,
    categories: Vec<Category>,
}

impl DatasetLoader {
    /// Create a loader serving only `categories` out of `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>, categories: &[Category]) -> Self {
        Self {
            data_dir: data_dir.into(),
            categories: categories.to_vec(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Map a caller-supplied label onto an enabled [`Category`].
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::NotFound`] for labels outside the fixed set and
    /// for categories this loader was not configured to serve.
    pub fn resolve(&self, label: &str) -> Result<Category, DatasetError> {
        label
            .parse::<Category>()
            .ok()
            .filter(|c| self.categories.contains(c))
            .ok_or_else(|| DatasetError::NotFound {
                category: label.to_string(),
            })
    }

    #[must_use]
    pub fn dataset_path(&self, category: Category) -> PathBuf {
        self.data_dir
            .join(format!("news_{}_predicted.csv", category.as_str()))
    }

    /// Resolve `label` and load its dataset. No file is touched when the
    /// label does not resolve.
    ///
    /// # Errors
    ///
    /// See [`DatasetLoader::resolve`] and [`DatasetLoader::load_category`].
    pub fn load(&self, label: &str) -> Result<Vec<ArticleRecord>, DatasetError> {
        let category = self.resolve(label)?;
        self.load_category(category)
    }

    /// Read and parse the dataset for `category` with a fresh file handle.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::NotFound`] if the file does not exist,
    /// [`DatasetError::Io`] for other open failures, and
    /// [`DatasetError::Parse`] if any row is malformed.
    pub fn load_category(&self, category: Category) -> Result<Vec<ArticleRecord>, DatasetError> {
        let path = self.dataset_path(category);
        tracing::debug!(category = %category, path = %path.display(), "loading dataset");

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    category = %category,
                    path = %path.display(),
                    "dataset file not found"
                );
                return Err(DatasetError::NotFound {
                    category: category.to_string(),
                });
            }
            Err(e) => {
                return Err(DatasetError::Io {
                    path: path.display().to_string(),
                    source: e,
                })
            }
        };

        let records = parse_dataset(file, category)?;
        tracing::debug!(category = %category, records = records.len(), "dataset loaded");
        Ok(records)
    }
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    title: usize,
    description: Option<usize>,
    url: Option<usize>,
    published_at: Option<usize>,
    sentiment: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord, category: Category) -> Result<Self, DatasetError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
        };

        let title = find(TITLE).ok_or_else(|| DatasetError::Parse {
            category,
            row: 0,
            reason: format!("missing required column '{TITLE}'"),
        })?;

        Ok(Self {
            title,
            description: find(DESCRIPTION),
            url: find(URL),
            published_at: PUBLISHED_AT.iter().find_map(|name| find(*name)),
            sentiment: find(PREDICTED_SENTIMENT),
        })
    }
}

/// Parse a dataset from any reader. The first row must be a header.
///
/// Input with no header row at all is an empty dataset.
///
/// # Errors
///
/// Returns [`DatasetError::Parse`] naming the first offending row.
pub fn parse_dataset<R: Read>(
    reader: R,
    category: Category,
) -> Result<Vec<ArticleRecord>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| DatasetError::Parse {
            category,
            row: 0,
            reason: e.to_string(),
        })?
        .clone();

    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let columns = Columns::from_headers(&headers, category)?;

    let mut records = Vec::new();
    for (idx, result) in csv_reader.records().enumerate() {
        let row = idx + 1;
        let record = result.map_err(|e| DatasetError::Parse {
            category,
            row,
            reason: e.to_string(),
        })?;
        records.push(parse_row(&record, &columns, category, row)?);
    }

    Ok(records)
}

fn parse_row(
    record: &StringRecord,
    columns: &Columns,
    category: Category,
    row: usize,
) -> Result<ArticleRecord, DatasetError> {
    let title = record
        .get(columns.title)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| DatasetError::Parse {
            category,
            row,
            reason: format!("empty {TITLE}"),
        })?;

    let published_at = match optional_cell(record, columns.published_at) {
        Some(raw) => Some(parse_published_at(raw).ok_or_else(|| DatasetError::Parse {
            category,
            row,
            reason: format!("unparseable PublishedAt '{raw}'"),
        })?),
        None => None,
    };

    let sentiment = columns
        .sentiment
        .and_then(|idx| record.get(idx))
        .map_or(Sentiment::Unrecognized, Sentiment::from_label);

    Ok(ArticleRecord {
        title: title.to_string(),
        description: optional_cell(record, columns.description).map(ToOwned::to_owned),
        url: optional_cell(record, columns.url).map(ToOwned::to_owned),
        published_at,
        sentiment,
    })
}

fn optional_cell(record: &StringRecord, idx: Option<usize>) -> Option<&str> {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != MISSING_PLACEHOLDER)
}

/// Accepts RFC 3339, naive date-times (taken as UTC) and bare dates.
fn parse_published_at(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn parse(csv: &str) -> Result<Vec<ArticleRecord>, DatasetError> {
        parse_dataset(csv.as_bytes(), Category::Business)
    }

    #[test]
    fn parses_rows_in_file_order() {
        let csv = "Title,Description,URL,PublishedAt,Predicted_Sentiment\n\
                   First,Desc one,https://a.example,2025-02-10T08:00:00Z,positive\n\
                   Second,,https://b.example,2025-02-09T23:59:59Z,NEGATIVE\n";
        let records = parse(csv).expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "First");
        assert_eq!(records[0].description.as_deref(), Some("Desc one"));
        assert_eq!(records[0].sentiment, Sentiment::Positive);
        assert_eq!(
            records[0].published_at,
            Some(Utc.with_ymd_and_hms(2025, 2, 10, 8, 0, 0).unwrap())
        );
        assert_eq!(records[1].title, "Second");
        assert!(records[1].description.is_none());
        assert_eq!(records[1].sentiment, Sentiment::Negative);
    }

    #[test]
    fn header_only_is_empty_dataset() {
        let records = parse("Title,Predicted_Sentiment\n").expect("parse");
        assert!(records.is_empty());
    }

    #[test]
    fn zero_byte_input_is_empty_dataset() {
        let records = parse("").expect("parse");
        assert!(records.is_empty());
    }

    #[test]
    fn missing_title_column_fails_at_header() {
        let err = parse("Headline,Predicted_Sentiment\nx,positive\n").unwrap_err();
        assert!(
            matches!(err, DatasetError::Parse { row: 0, ref reason, .. } if reason.contains("Title")),
            "got: {err:?}"
        );
    }

    #[test]
    fn empty_title_reports_row_index() {
        let csv = "Title,Predicted_Sentiment\nok,positive\n  ,neutral\n";
        let err = parse(csv).unwrap_err();
        assert!(
            matches!(err, DatasetError::Parse { row: 2, ref reason, .. } if reason.contains("Title")),
            "got: {err:?}"
        );
    }

    #[test]
    fn ragged_row_is_parse_error() {
        let csv = "Title,Predicted_Sentiment\nok,positive\nextra,neutral,surplus\n";
        let err = parse(csv).unwrap_err();
        assert!(
            matches!(err, DatasetError::Parse { row: 2, .. }),
            "got: {err:?}"
        );
    }

    #[test]
    fn bad_timestamp_is_parse_error() {
        let csv = "Title,PublishedAt,Predicted_Sentiment\nok,yesterday-ish,positive\n";
        let err = parse(csv).unwrap_err();
        assert!(
            matches!(err, DatasetError::Parse { row: 1, ref reason, .. } if reason.contains("yesterday-ish")),
            "got: {err:?}"
        );
    }

    #[test]
    fn scraper_style_columns_and_placeholders() {
        let csv = "Title,Author,Source,Published At,URL,Description,Cleaned_Description,Predicted_Sentiment\n\
                   Headline,N/A,Wire,2025-03-01 14:30:00,N/A,N/A,headline,Neutral\n";
        let records = parse(csv).expect("parse");
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert!(record.url.is_none());
        assert!(record.description.is_none());
        assert_eq!(
            record.published_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 1, 14, 30, 0).unwrap())
        );
        assert_eq!(record.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn camel_case_published_at_header_is_accepted() {
        let csv = "Title,publishedAt,Predicted_Sentiment\n\
                   Markets open,2025-03-02T08:00:00Z,positive\n";
        let records = parse(csv).expect("parse");
        assert_eq!(
            records[0].published_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 2, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn byte_order_mark_before_title_is_ignored() {
        let csv = "\u{feff}Title,Predicted_Sentiment\nMarkets close,negative\n";
        let records = parse(csv).expect("parse");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Markets close");
        assert_eq!(records[0].sentiment, Sentiment::Negative);
    }

    #[test]
    fn missing_sentiment_column_yields_unrecognized() {
        let records = parse("Title\nLonely headline\n").expect("parse");
        assert_eq!(records[0].sentiment, Sentiment::Unrecognized);
    }

    #[test]
    fn parse_published_at_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 2, 10, 12, 34, 56).unwrap();
        assert_eq!(parse_published_at("2025-02-10T12:34:56Z"), Some(expected));
        assert_eq!(parse_published_at("2025-02-10T14:34:56+02:00"), Some(expected));
        assert_eq!(parse_published_at("2025-02-10 12:34:56+00:00"), Some(expected));
        assert_eq!(parse_published_at("2025-02-10 12:34:56"), Some(expected));
        assert_eq!(parse_published_at("2025-02-10T12:34:56"), Some(expected));
        assert_eq!(
            parse_published_at("2025-02-10"),
            Some(Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_published_at("10/02/2025"), None);
    }

    #[test]
    fn resolve_rejects_unknown_and_disabled_categories() {
        let loader = DatasetLoader::new("/nonexistent", &[Category::Sports]);
        assert_eq!(loader.resolve("sports").unwrap(), Category::Sports);
        assert!(matches!(
            loader.resolve("finance"),
            Err(DatasetError::NotFound { ref category }) if category == "finance"
        ));
        assert!(matches!(
            loader.resolve("health"),
            Err(DatasetError::NotFound { .. })
        ));
    }

    #[test]
    fn dataset_path_follows_naming_convention() {
        let loader = DatasetLoader::new("/srv/data", &Category::ALL);
        assert_eq!(
            loader.dataset_path(Category::Politics),
            PathBuf::from("/srv/data/news_politics_predicted.csv")
        );
    }
}
