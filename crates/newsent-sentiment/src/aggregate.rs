//! Pure aggregation of classified articles into dashboard statistics.
//!
//! Nothing here performs I/O or touches shared state; every function works on
//! the snapshot it is handed.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::types::{ArticleRecord, Sentiment};

/// Per-class article counts. `Unrecognized` records are never counted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl SentimentCounts {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.positive + self.neutral + self.negative
    }

    /// Returns `false` when the sentiment has no bucket.
    fn record(&mut self, sentiment: Sentiment) -> bool {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Unrecognized => return false,
        }
        true
    }
}

/// Share of each class among counted records, rounded to one decimal place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SentimentPercentages {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentPercentages {
    #[must_use]
    pub fn from_counts(counts: &SentimentCounts) -> Self {
        let total = counts.total();
        if total == 0 {
            return Self::default();
        }
        Self {
            positive: percent(counts.positive, total),
            neutral: percent(counts.neutral, total),
            negative: percent(counts.negative, total),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(count: u64, total: u64) -> f64 {
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

/// Counts for a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendBucket {
    pub date: NaiveDate,
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

/// Chart-ready trend: three count sequences aligned to `labels`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrendSeries {
    pub labels: Vec<String>,
    pub positive: Vec<u64>,
    pub neutral: Vec<u64>,
    pub negative: Vec<u64>,
}

impl From<&[TrendBucket]> for TrendSeries {
    fn from(buckets: &[TrendBucket]) -> Self {
        let mut series = TrendSeries::default();
        for bucket in buckets {
            series
                .labels
                .push(bucket.date.format("%Y-%m-%d").to_string());
            series.positive.push(bucket.positive);
            series.neutral.push(bucket.neutral);
            series.negative.push(bucket.negative);
        }
        series
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSummary {
    /// Every record in the dataset, including unrecognized ones.
    pub total_records: u64,
    pub counts: SentimentCounts,
    /// Records left out of `counts` because their label was not recognized.
    pub unrecognized: u64,
    pub percentages: SentimentPercentages,
    /// Mean of +1 / 0 / -1 over all records; 0 for an empty dataset.
    pub average_score: f64,
    /// Ascending by date, one bucket per distinct day.
    pub trend: Vec<TrendBucket>,
}

impl SentimentSummary {
    #[must_use]
    pub fn trend_series(&self) -> TrendSeries {
        TrendSeries::from(self.trend.as_slice())
    }
}

/// Summarize `records`, dating undated articles with today's UTC date.
#[must_use]
pub fn summarize(records: &[ArticleRecord]) -> SentimentSummary {
    summarize_as_of(records, Utc::now().date_naive())
}

/// Summarize `records`, placing articles without a publish time on `today`.
#[must_use]
pub fn summarize_as_of(records: &[ArticleRecord], today: NaiveDate) -> SentimentSummary {
    let mut counts = SentimentCounts::default();
    let mut unrecognized = 0_u64;
    let mut score_sum = 0_i64;
    let mut by_day: BTreeMap<NaiveDate, SentimentCounts> = BTreeMap::new();

    for record in records {
        if !counts.record(record.sentiment) {
            unrecognized += 1;
        }
        score_sum += record.sentiment.score();

        let day = record
            .published_at
            .map_or(today, |published| published.date_naive());
        // The day gets a bucket even when the record has none.
        by_day.entry(day).or_default().record(record.sentiment);
    }

    let total_records = records.len() as u64;

    #[allow(clippy::cast_precision_loss)]
    let average_score = if records.is_empty() {
        0.0
    } else {
        score_sum as f64 / total_records as f64
    };

    let trend = by_day
        .into_iter()
        .map(|(date, day)| TrendBucket {
            date,
            positive: day.positive,
            neutral: day.neutral,
            negative: day.negative,
        })
        .collect();

    SentimentSummary {
        total_records,
        counts,
        unrecognized,
        percentages: SentimentPercentages::from_counts(&counts),
        average_score,
        trend,
    }
}

/// Records of a single class, in their original order.
#[must_use]
pub fn filter_by_sentiment(records: &[ArticleRecord], sentiment: Sentiment) -> Vec<ArticleRecord> {
    records
        .iter()
        .filter(|r| r.sentiment == sentiment)
        .cloned()
        .collect()
}
