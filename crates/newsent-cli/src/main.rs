mod counter;
mod sentiment;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "newsent-cli")]
#[command(about = "Inspect news sentiment datasets and the request counter")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Summarize one category's dataset
    Summary {
        /// Category label, e.g. `sports`
        category: String,

        /// Print the summary as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print one category's records as JSON
    Records {
        /// Category label, e.g. `sports`
        category: String,

        /// Only records of this class (positive, neutral, negative)
        #[arg(long)]
        sentiment: Option<String>,
    },
    /// Show the persisted request count
    Count {
        /// Advance the counter by one before printing it
        #[arg(long)]
        increment: bool,
    },
    /// List enabled categories and whether their dataset exists
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = newsent_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Summary { category, json } => {
            sentiment::run_summary(&config, &category, json).await
        }
        Commands::Records {
            category,
            sentiment,
        } => sentiment::run_records(&config, &category, sentiment.as_deref()).await,
        Commands::Count { increment } => counter::run_count(&config, increment).await,
        Commands::Categories => {
            sentiment::run_categories(&config);
            Ok(())
        }
    }
}
