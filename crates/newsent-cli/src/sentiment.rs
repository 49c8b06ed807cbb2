//! Sentiment dataset command handlers for the CLI.

use std::fmt::Write as _;

use newsent_core::AppConfig;
use newsent_sentiment::{
    filter_by_sentiment, CategoryDataService, DatasetLoader, Sentiment, SentimentSummary,
};

fn service(config: &AppConfig) -> CategoryDataService {
    CategoryDataService::new(DatasetLoader::new(
        config.data_dir.clone(),
        &config.categories,
    ))
}

/// Load and summarize `category`, printing a table or JSON.
///
/// # Errors
///
/// Returns an error if the category is unknown or its dataset is unreadable.
pub(crate) async fn run_summary(
    config: &AppConfig,
    category: &str,
    as_json: bool,
) -> anyhow::Result<()> {
    let report = service(config).query(category).await?;
    tracing::info!(
        category = %report.category,
        records = report.summary.total_records,
        "dataset summarized"
    );
    if as_json {
        println!("{}", serde_json::to_string_pretty(&report.summary)?);
    } else {
        print!("{}", format_summary(category, &report.summary));
    }
    Ok(())
}

/// Print `category`'s records as a JSON array, optionally filtered.
///
/// # Errors
///
/// Returns an error for an unknown sentiment filter or a failed load.
pub(crate) async fn run_records(
    config: &AppConfig,
    category: &str,
    sentiment: Option<&str>,
) -> anyhow::Result<()> {
    let filter = match sentiment.map(Sentiment::from_label) {
        Some(Sentiment::Unrecognized) => {
            anyhow::bail!("sentiment filter must be positive, neutral or negative")
        }
        other => other,
    };

    let (_, records) = service(config).records(category).await?;
    let loaded = records.len();
    let records = match filter {
        Some(sentiment) => filter_by_sentiment(&records, sentiment),
        None => records,
    };
    tracing::info!(category, loaded, printed = records.len(), "records selected");
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

pub(crate) fn run_categories(config: &AppConfig) {
    let service = service(config);
    let loader = service.loader();
    println!("data dir: {}", loader.data_dir().display());
    for category in loader.categories() {
        let status = if loader.dataset_path(*category).is_file() {
            "ready"
        } else {
            "missing"
        };
        println!("{category:<14} {status}");
    }
}

fn format_summary(category: &str, summary: &SentimentSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "category: {category}");
    let _ = writeln!(
        out,
        "records:  {} ({} unrecognized)",
        summary.total_records, summary.unrecognized
    );
    let _ = writeln!(
        out,
        "positive: {:>6} {:>5.1}%",
        summary.counts.positive, summary.percentages.positive
    );
    let _ = writeln!(
        out,
        "neutral:  {:>6} {:>5.1}%",
        summary.counts.neutral, summary.percentages.neutral
    );
    let _ = writeln!(
        out,
        "negative: {:>6} {:>5.1}%",
        summary.counts.negative, summary.percentages.negative
    );
    let _ = writeln!(out, "average:  {:.2}", summary.average_score);

    if !summary.trend.is_empty() {
        let _ = writeln!(out, "trend:");
        for bucket in &summary.trend {
            let _ = writeln!(
                out,
                "  {}  +{} ={} -{}",
                bucket.date, bucket.positive, bucket.neutral, bucket.negative
            );
        }
    }
    out
}
