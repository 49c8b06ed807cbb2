use chrono::{DateTime, Utc};
use serde::Serialize;

/// Class assigned to an article by the upstream classifier.
///
/// Source labels are matched case-insensitively once, at ingestion. Anything
/// that is not one of the three known labels becomes `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    Unrecognized,
}

impl Sentiment {
    #[must_use]
    pub fn from_label(raw: &str) -> Self {
        let label = raw.trim();
        if label.eq_ignore_ascii_case("positive") {
            Sentiment::Positive
        } else if label.eq_ignore_ascii_case("neutral") {
            Sentiment::Neutral
        } else if label.eq_ignore_ascii_case("negative") {
            Sentiment::Negative
        } else {
            Sentiment::Unrecognized
        }
    }

    /// Weight used for the average score. `Unrecognized` counts as neutral.
    #[must_use]
    pub fn score(self) -> i64 {
        match self {
            Sentiment::Positive => 1,
            Sentiment::Neutral | Sentiment::Unrecognized => 0,
            Sentiment::Negative => -1,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
            Sentiment::Unrecognized => "Unrecognized",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified article as served to the dashboard.
///
/// Serialized field names match the dataset column names the dashboard
/// already consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "URL")]
    pub url: Option<String>,
    #[serde(rename = "PublishedAt")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(rename = "Predicted_Sentiment")]
    pub sentiment: Sentiment,
}
