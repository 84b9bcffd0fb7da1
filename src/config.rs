//! Configuration from environment variables and command-line flags
//!
//! Loaded once at startup and passed down explicitly; nothing in the library
//! reads the environment on its own.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "data/stockflow.db";
pub const DEFAULT_OUTPUT: &str = "analysis.json";
pub const DEFAULT_YAHOO_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing argument: {0}")]
    MissingArgument(String),
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Where the upsert store lives
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub db_path: PathBuf,
}

impl StoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }
}

/// Settings for the Yahoo chart source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub base_url: String,
    /// Yahoo `range` parameter, e.g. `2y`
    pub history_range: String,
    pub timeout: Duration,
}

/// Process-wide configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub source: SourceConfig,
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `STOCKFLOW_DB_PATH` (default: data/stockflow.db)
    /// - `STOCKFLOW_LOG_LEVEL` (default: info)
    /// - `STOCKFLOW_YAHOO_URL` (default: https://query1.finance.yahoo.com)
    /// - `STOCKFLOW_HISTORY_RANGE` (default: 2y)
    /// - `STOCKFLOW_HTTP_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = match env::var("STOCKFLOW_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(format!("STOCKFLOW_HTTP_TIMEOUT_SECS={}", raw))
            })?,
            Err(_) => 10,
        };

        Ok(Self {
            store: StoreConfig::new(
                env::var("STOCKFLOW_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string()),
            ),
            source: SourceConfig {
                base_url: env::var("STOCKFLOW_YAHOO_URL")
                    .unwrap_or_else(|_| DEFAULT_YAHOO_URL.to_string()),
                history_range: env::var("STOCKFLOW_HISTORY_RANGE")
                    .unwrap_or_else(|_| "2y".to_string()),
                timeout: Duration::from_secs(timeout_secs),
            },
            log_level: env::var("STOCKFLOW_LOG_LEVEL")
                .map(|level| level.to_lowercase())
                .unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Parsed command-line flags
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub ticker: String,
    pub output: PathBuf,
    /// Read bars from this JSON file instead of the network
    pub input: Option<PathBuf>,
    pub init_db: bool,
}

pub const USAGE: &str =
    "Usage: stockflow --ticker <SYMBOL> [--output <FILE>] [--input <JSON FILE>] [--initdb | --no-initdb]";

impl CliArgs {
    /// Parse flags (without the program name)
    pub fn parse(args: &[String]) -> Result<Self, ConfigError> {
        let mut ticker = None;
        let mut output = PathBuf::from(DEFAULT_OUTPUT);
        let mut input = None;
        let mut init_db = true;

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--ticker" | "-t" => ticker = Some(next_value(&mut iter, arg)?),
                "--output" | "-o" => output = PathBuf::from(next_value(&mut iter, arg)?),
                "--input" | "-i" => input = Some(PathBuf::from(next_value(&mut iter, arg)?)),
                "--initdb" => init_db = true,
                "--no-initdb" => init_db = false,
                other => {
                    return Err(ConfigError::InvalidValue(format!(
                        "unknown argument '{}'. {}",
                        other, USAGE
                    )))
                }
            }
        }

        let ticker = ticker
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingArgument(format!("--ticker. {}", USAGE)))?;

        Ok(Self {
            ticker,
            output,
            input,
            init_db,
        })
    }
}

fn next_value<'a>(
    iter: &mut impl Iterator<Item = &'a String>,
    flag: &str,
) -> Result<String, ConfigError> {
    iter.next()
        .cloned()
        .ok_or_else(|| ConfigError::MissingArgument(format!("value for {}", flag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let parsed = CliArgs::parse(&args(&["--ticker", "reliance.ns"])).unwrap();

        assert_eq!(parsed.ticker, "RELIANCE.NS");
        assert_eq!(parsed.output, PathBuf::from("analysis.json"));
        assert!(parsed.input.is_none());
        assert!(parsed.init_db);
    }

    #[test]
    fn test_parse_short_flags() {
        let parsed = CliArgs::parse(&args(&[
            "-t", "AAPL", "-o", "out/aapl.json", "-i", "bars.json", "--no-initdb",
        ]))
        .unwrap();

        assert_eq!(parsed.ticker, "AAPL");
        assert_eq!(parsed.output, PathBuf::from("out/aapl.json"));
        assert_eq!(parsed.input, Some(PathBuf::from("bars.json")));
        assert!(!parsed.init_db);
    }

    #[test]
    fn test_missing_ticker() {
        let err = CliArgs::parse(&args(&["--output", "x.json"])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingArgument(_)));

        let err = CliArgs::parse(&args(&["--ticker"])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingArgument(_)));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let err = CliArgs::parse(&args(&["--ticker", "AAPL", "--verbose"])).unwrap_err();
        assert!(err.to_string().contains("--verbose"));
    }

    #[test]
    fn test_env_config() {
        // Single test touches the environment to avoid races between tests
        env::remove_var("STOCKFLOW_DB_PATH");
        env::remove_var("STOCKFLOW_LOG_LEVEL");
        env::remove_var("STOCKFLOW_HISTORY_RANGE");
        env::remove_var("STOCKFLOW_YAHOO_URL");
        env::remove_var("STOCKFLOW_HTTP_TIMEOUT_SECS");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.store.db_path, PathBuf::from("data/stockflow.db"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.source.history_range, "2y");
        assert_eq!(config.source.base_url, DEFAULT_YAHOO_URL);
        assert_eq!(config.source.timeout, Duration::from_secs(10));

        env::set_var("STOCKFLOW_DB_PATH", "/tmp/custom.db");
        env::set_var("STOCKFLOW_LOG_LEVEL", "DEBUG");
        env::set_var("STOCKFLOW_HTTP_TIMEOUT_SECS", "30");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.store.db_path, PathBuf::from("/tmp/custom.db"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.source.timeout, Duration::from_secs(30));

        env::set_var("STOCKFLOW_HTTP_TIMEOUT_SECS", "soon");
        assert!(matches!(AppConfig::from_env(), Err(ConfigError::InvalidValue(_))));

        // Cleanup
        env::remove_var("STOCKFLOW_DB_PATH");
        env::remove_var("STOCKFLOW_LOG_LEVEL");
        env::remove_var("STOCKFLOW_HTTP_TIMEOUT_SECS");
    }
}
