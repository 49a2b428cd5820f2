use anyhow::{bail, Context, Result};
use gdax_history::prelude::*;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

// Pulls one bounded date range of candles and writes JSON lines.
//
// Usage: gdax-pull <SYMBOL> <START_DATE> <END_DATE> [OUTPUT_PATH]

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 || args.len() > 4 {
        bail!("usage: gdax-pull <SYMBOL> <START_DATE> <END_DATE> [OUTPUT_PATH]");
    }
    let symbol = &args[0];
    let start_date = &args[1];
    let end_date = &args[2];
    let output = args.get(3).map(PathBuf::from);

    info!(
        "gdax-pull {} ({}@{}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_BRANCH"),
        env!("GIT_HASH"),
        env!("BUILD_TIME")
    );

    let config = PullConfig::from_env().context("Failed to load configuration")?;
    let client = GdaxClient::new(&config).context("Failed to create exchange client")?;
    let fetcher = ChunkedFetcher::from_config(client, &config);

    let (dataset, stats) = fetcher
        .fetch_range_with_stats(symbol, start_date, end_date, config.granularity)
        .await
        .with_context(|| format!("Failed to pull {} from {} to {}", symbol, start_date, end_date))?;

    let written = match output {
        Some(path) => write_json_lines_to_path(&dataset, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => write_json_lines(&dataset, io::stdout().lock()).context("Failed to write to stdout")?,
    };

    info!(
        "Done: {} rows from {} chunks ({} requests, {} rate-limit retries, {} 5xx retries)",
        written, stats.chunks, stats.requests, stats.rate_limit_retries, stats.unavailable_retries
    );

    Ok(())
}
