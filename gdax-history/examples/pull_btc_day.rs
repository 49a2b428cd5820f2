//! Example: pull one day of BTC-USD one-minute candles

use gdax_history::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("=== gdax-history: BTC-USD 2021-01-01 ===\n");

    let config = PullConfig {
        request_delay_ms: 200,
        ..PullConfig::default()
    };
    let client = GdaxClient::new(&config)?;
    let fetcher = ChunkedFetcher::from_config(client, &config);

    let boundaries = RangePlanner::default().plan_dates("2021-01-01", "2021-01-02")?;
    println!("Planned {} boundaries, 5h apart", boundaries.len());

    let (dataset, stats) = fetcher
        .fetch_range_with_stats("BTC-USD", "2021-01-01", "2021-01-02", Granularity::OneMinute)
        .await?;

    println!(
        "Fetched {} candles in {} requests ({} rate-limit retries)",
        dataset.len(),
        stats.requests,
        stats.rate_limit_retries
    );
    if let (Some(first), Some(last)) = (dataset.first(), dataset.last()) {
        println!("First: {} close={}", first.time, first.close);
        println!("Last:  {} close={}", last.time, last.close);
    }

    Ok(())
}
