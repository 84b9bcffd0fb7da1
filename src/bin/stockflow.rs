//! stockflow - single-ticker analysis runner
//!
//! Fetches daily history, derives SMA50/SMA200, detects golden/death
//! crosses, upserts everything into SQLite and writes a JSON summary.
//!
//! Usage:
//!   stockflow --ticker RELIANCE.NS [--output analysis.json] [--input bars.json] [--no-initdb]
//!
//! Without --input, bars come from the Yahoo chart API, which has no
//! fundamentals: price_to_book, bvps and enterprise_value are stored as NULL.
//!
//! Environment variables:
//!   STOCKFLOW_DB_PATH - SQLite database path (default: data/stockflow.db)
//!   STOCKFLOW_LOG_LEVEL - default log filter when RUST_LOG is unset (default: info)
//!   STOCKFLOW_YAHOO_URL - chart API base URL
//!   STOCKFLOW_HISTORY_RANGE - history to request (default: 2y)
//!   STOCKFLOW_HTTP_TIMEOUT_SECS - request timeout (default: 10)

use dotenv::dotenv;
use log::{error, info};
use stockflow::config::{AppConfig, CliArgs};
use stockflow::export::write_report;
use stockflow::source::{DataSource, JsonFileSource, YahooChartSource};
use stockflow::store::{SqliteStore, UpsertStore};
use stockflow::run_pipeline;

#[tokio::main]
async fn main() {
    dotenv().ok();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_level.as_str()))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(config, cli).await {
        error!("❌ Run failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig, cli: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    info!("🚀 Starting pipeline for {}", cli.ticker);
    info!("   ├─ Database: {}", config.store.db_path.display());
    info!("   └─ Output: {}", cli.output.display());

    let mut store = SqliteStore::open(&config.store)?;
    if cli.init_db {
        store.initialize()?;
        info!("✅ Database initialized");
    }

    let source: Box<dyn DataSource> = match &cli.input {
        Some(path) => Box::new(JsonFileSource::new(path.clone())),
        None => Box::new(YahooChartSource::new(config.source.clone())),
    };
    info!("🔌 Data source: {}", source.name());

    let series = source.fetch(&cli.ticker).await?;
    let report = run_pipeline(&mut store, &series)?;

    write_report(&cli.output, &report)?;

    info!(
        "📊 Stored: {} metric rows, {} signal events for {}",
        store.count_metrics(&cli.ticker)?,
        store.count_signal_events(&cli.ticker)?,
        cli.ticker
    );
    info!("✅ Finished. JSON exported to {}", cli.output.display());

    Ok(())
}
