//! End-to-end tests: JSON source → analysis → SQLite store → report
//!
//! Each test uses its own temporary directory for the database and files.

#[cfg(test)]
mod pipeline_integration_tests {
    use chrono::{Duration, NaiveDate};
    use serde_json::json;
    use std::fs;
    use std::path::Path;
    use stockflow::analysis::{RawBar, SignalType};
    use stockflow::config::StoreConfig;
    use stockflow::export::{load_report, write_report};
    use stockflow::{run_pipeline, PipelineError};
    use stockflow::source::{DataSource, JsonFileSource, SourcedSeries};
    use stockflow::store::{SqliteStore, UpsertStore};
    use tempfile::tempdir;

    const TICKER: &str = "RELIANCE.NS";

    fn day(offset: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 1, 3).unwrap() + Duration::days(offset as i64)
    }

    /// Flat at 100 for 250 days, rising 1/day for 50 days, then falling 0.5/day
    ///
    /// SMA50 equals SMA200 through day 249, so the first golden cross is day 250.
    fn trend_closes() -> Vec<f64> {
        (0..500)
            .map(|i| match i {
                0..=249 => 100.0,
                250..=299 => 100.0 + (i - 249) as f64,
                _ => 150.0 - (i - 299) as f64 * 0.5,
            })
            .collect()
    }

    fn write_bars(path: &Path, closes: &[Option<f64>]) {
        let bars: Vec<serde_json::Value> = closes
            .iter()
            .enumerate()
            .map(|(i, close)| {
                json!({
                    "date": day(i).format("%Y-%m-%d").to_string(),
                    "open": close,
                    "close": close,
                    "volume": 1_000 + i,
                })
            })
            .collect();
        let doc = json!({
            "bars": bars,
            "fundamentals": {"price_to_book": 2.3, "enterprise_value": 1.8e13},
        });
        fs::write(path, serde_json::to_string(&doc).unwrap()).unwrap();
    }

    fn open_store(dir: &Path) -> SqliteStore {
        let mut store = SqliteStore::open(&StoreConfig::new(dir.join("db").join("stockflow.db"))).unwrap();
        store.initialize().unwrap();
        store
    }

    #[tokio::test]
    async fn test_full_run_persists_metrics_and_signals() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bars.json");
        let closes: Vec<Option<f64>> = trend_closes().into_iter().map(Some).collect();
        write_bars(&input, &closes);

        let series = JsonFileSource::new(&input).fetch(TICKER).await.unwrap();
        assert_eq!(series.fundamentals_used, "snapshot");

        let mut store = open_store(dir.path());
        let report = run_pipeline(&mut store, &series).unwrap();

        assert_eq!(report.price_rows_count, 500);
        assert_eq!(store.count_metrics(TICKER).unwrap(), 500);

        let golden: Vec<NaiveDate> = report
            .signals
            .iter()
            .filter(|e| e.signal_type == SignalType::GoldenCross)
            .map(|e| e.date)
            .collect();
        let death: Vec<NaiveDate> = report
            .signals
            .iter()
            .filter(|e| e.signal_type == SignalType::DeathCross)
            .map(|e| e.date)
            .collect();
        assert_eq!(golden.first(), Some(&day(250)));
        assert!(!death.is_empty());
        assert!(death.iter().all(|d| *d > day(299)));

        assert_eq!(store.count_signal_events(TICKER).unwrap(), report.signals.len());

        let rows = store.load_metrics(TICKER).unwrap();
        assert!(rows[48].sma50.is_none());
        assert_eq!(rows[49].sma50, Some(100.0));
        assert!(rows[198].sma200.is_none());
        assert_eq!(rows[199].sma200, Some(100.0));
        assert_eq!(rows[0].price_to_book, Some(2.3));
        assert_eq!(rows[0].volume, Some(1_000));
    }

    #[tokio::test]
    async fn test_rerun_is_idempotent() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bars.json");
        let closes: Vec<Option<f64>> = trend_closes().into_iter().map(Some).collect();
        write_bars(&input, &closes);

        let series = JsonFileSource::new(&input).fetch(TICKER).await.unwrap();

        {
            let mut store = open_store(dir.path());
            run_pipeline(&mut store, &series).unwrap();
        }
        let (metrics_before, events_before, ticker_before) = {
            let store = open_store(dir.path());
            (
                store.load_metrics(TICKER).unwrap(),
                store.load_signal_events(TICKER).unwrap(),
                store.load_ticker(TICKER).unwrap(),
            )
        };

        // Second process start: initialize again and replay the same input
        let mut store = open_store(dir.path());
        let report = run_pipeline(&mut store, &series).unwrap();

        assert_eq!(store.load_metrics(TICKER).unwrap(), metrics_before);
        assert_eq!(store.load_signal_events(TICKER).unwrap(), events_before);
        assert_eq!(store.load_ticker(TICKER).unwrap(), ticker_before);
        assert_eq!(store.count_signal_events(TICKER).unwrap(), report.signals.len());
    }

    #[tokio::test]
    async fn test_gap_in_close_persists_null_averages() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("gap.json");
        let mut closes = vec![Some(50.0); 260];
        closes[30] = None;
        write_bars(&input, &closes);

        let series = JsonFileSource::new(&input).fetch(TICKER).await.unwrap();
        let mut store = open_store(dir.path());
        let report = run_pipeline(&mut store, &series).unwrap();

        assert!(report.signals.is_empty());

        let rows = store.load_metrics(TICKER).unwrap();
        assert!(rows[30].close.is_none());
        assert!(rows[79].sma50.is_none());
        assert_eq!(rows[80].sma50, Some(50.0));
        assert!(rows[229].sma200.is_none());
        assert_eq!(rows[230].sma200, Some(50.0));
    }

    #[test]
    fn test_empty_series_is_a_noop() {
        let dir = tempdir().unwrap();
        let mut store = open_store(dir.path());

        let series = SourcedSeries {
            ticker: TICKER.to_string(),
            bars: Vec::<RawBar>::new(),
            fundamentals_used: "none".to_string(),
        };
        let report = run_pipeline(&mut store, &series).unwrap();

        assert_eq!(report.price_rows_count, 0);
        assert!(report.signals.is_empty());
        assert_eq!(store.count_metrics(TICKER).unwrap(), 0);
        assert!(store.load_ticker(TICKER).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_dates_abort_before_any_write() {
        let dir = tempdir().unwrap();
        let mut store = open_store(dir.path());

        let series = SourcedSeries {
            ticker: TICKER.to_string(),
            bars: vec![
                RawBar::with_close(day(0), Some(1.0)),
                RawBar::with_close(day(1), Some(2.0)),
                RawBar::with_close(day(1), Some(3.0)),
            ],
            fundamentals_used: "none".to_string(),
        };

        let err = run_pipeline(&mut store, &series).unwrap_err();
        assert!(err.to_string().contains(TICKER));
        assert_eq!(store.count_metrics(TICKER).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_out_of_order_file_is_rejected() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("unordered.json");
        let doc = json!([
            {"date": "2024-01-02", "close": 10.0},
            {"date": "2024-01-04", "close": 11.0},
            {"date": "2024-01-03", "close": 12.0},
        ]);
        fs::write(&input, serde_json::to_string(&doc).unwrap()).unwrap();

        let series = JsonFileSource::new(&input).fetch(TICKER).await.unwrap();
        let mut store = open_store(dir.path());

        let err = run_pipeline(&mut store, &series).unwrap_err();

        assert!(matches!(err, PipelineError::Analysis { .. }));
        assert_eq!(store.count_metrics(TICKER).unwrap(), 0);
        assert_eq!(store.count_signal_events(TICKER).unwrap(), 0);
        assert!(store.load_ticker(TICKER).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_report_round_trip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("bars.json");
        let closes: Vec<Option<f64>> = trend_closes().into_iter().map(Some).collect();
        write_bars(&input, &closes);

        let series = JsonFileSource::new(&input).fetch(TICKER).await.unwrap();
        let mut store = open_store(dir.path());
        let report = run_pipeline(&mut store, &series).unwrap();

        let output = dir.path().join("out").join("analysis.json");
        write_report(&output, &report).unwrap();

        let loaded = load_report(&output).unwrap();
        assert_eq!(loaded, report);

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(raw["ticker"], TICKER);
        assert_eq!(raw["fundamentals_used"], "snapshot");
        assert!(raw["generated_at"].is_string());
    }
}
