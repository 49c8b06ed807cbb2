use newsent_core::AppConfig;
use newsent_store::RequestCounter;

/// Print the persisted request count, optionally advancing it first.
///
/// # Errors
///
/// Returns an error if the counter file exists but cannot be read.
pub(crate) async fn run_count(config: &AppConfig, increment: bool) -> anyhow::Result<()> {
    let counter = RequestCounter::new(config.counter_path.clone());
    let count = if increment {
        counter.increment().await?
    } else {
        counter.current().await?
    };
    tracing::debug!(
        path = %config.counter_path.display(),
        count,
        increment,
        "request count read"
    );
    println!("{count}");
    Ok(())
}
