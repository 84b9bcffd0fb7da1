//! SQLite upsert store
//!
//! Tables (see `/sql/` directory):
//! - `tickers` - registry, insert-if-absent on first write for a ticker
//! - `daily_metrics` - UPSERT on (ticker, date)
//! - `signal_events` - UPSERT on (ticker, date, signal_type)
//!
//! Every write call runs in exactly one transaction. On any failure the
//! transaction is dropped without commit, which rolls the whole batch back.

use super::error::{StoreError, TransactionFailure};
use super::UpsertStore;
use crate::analysis::{MetricRecord, SignalEvent, SignalType};
use crate::config::StoreConfig;
use crate::sqlite_pragma::apply_optimized_pragmas;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Transaction};

/// Schema files in execution order; all use IF NOT EXISTS
const SCHEMA_FILES: [(&str, &str); 3] = [
    ("01_tickers.sql", include_str!("../../sql/01_tickers.sql")),
    ("02_daily_metrics.sql", include_str!("../../sql/02_daily_metrics.sql")),
    ("03_signal_events.sql", include_str!("../../sql/03_signal_events.sql")),
];

const UPSERT_METRIC_SQL: &str = r#"
    INSERT INTO daily_metrics (
        ticker, date,
        open, high, low, close, volume,
        sma50, sma200,
        price_to_book, bvps, enterprise_value
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
    ON CONFLICT(ticker, date) DO UPDATE SET
        open = excluded.open,
        high = excluded.high,
        low = excluded.low,
        close = excluded.close,
        volume = excluded.volume,
        sma50 = excluded.sma50,
        sma200 = excluded.sma200,
        price_to_book = excluded.price_to_book,
        bvps = excluded.bvps,
        enterprise_value = excluded.enterprise_value
"#;

const UPSERT_SIGNAL_SQL: &str = r#"
    INSERT INTO signal_events (ticker, date, signal_type, meta)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(ticker, date, signal_type) DO UPDATE SET
        meta = excluded.meta
"#;

/// Registry row as stored
#[derive(Debug, Clone, PartialEq)]
pub struct TickerEntry {
    pub ticker: String,
    pub added_at: String,
    pub info: Option<String>,
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file named by `config`
    ///
    /// Creates the parent directory when missing. Does NOT create tables;
    /// call `initialize()` for that.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&config.db_path).map_err(StoreError::Open)?;
        apply_optimized_pragmas(&conn).map_err(StoreError::Open)?;

        log::info!("✅ SQLite store opened: {}", config.db_path.display());
        Ok(Self { conn })
    }

    /// Private in-memory database, gone when the store is dropped
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Open)?;
        apply_optimized_pragmas(&conn).map_err(StoreError::Open)?;
        Ok(Self { conn })
    }

    /// Upsert a registry row, replacing `info` but keeping `added_at`
    pub fn register_ticker(&mut self, ticker: &str, info: Option<&str>) -> Result<(), StoreError> {
        const OP: &str = "register_ticker";
        require_ticker(OP, ticker)?;

        self.conn
            .execute(
                "INSERT INTO tickers (ticker, added_at, info) VALUES (?1, ?2, ?3)
                 ON CONFLICT(ticker) DO UPDATE SET info = excluded.info",
                params![ticker, now_rfc3339(), info],
            )
            .map_err(|e| StoreError::Transaction {
                op: OP,
                ticker: ticker.to_string(),
                date: None,
                source: e.into(),
            })?;
        Ok(())
    }

    pub fn load_ticker(&self, ticker: &str) -> Result<Option<TickerEntry>, StoreError> {
        let entry = self
            .conn
            .query_row(
                "SELECT ticker, added_at, info FROM tickers WHERE ticker = ?1",
                [ticker],
                |row| {
                    Ok(TickerEntry {
                        ticker: row.get(0)?,
                        added_at: row.get(1)?,
                        info: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }

    /// All metric rows for `ticker`, ascending by date
    pub fn load_metrics(&self, ticker: &str) -> Result<Vec<MetricRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT date, open, high, low, close, volume, sma50, sma200,
                    price_to_book, bvps, enterprise_value
             FROM daily_metrics
             WHERE ticker = ?1
             ORDER BY date ASC",
        )?;

        let rows = stmt.query_map([ticker], |row| {
            Ok(MetricRecord {
                date: row.get(0)?,
                open: row.get(1)?,
                high: row.get(2)?,
                low: row.get(3)?,
                close: row.get(4)?,
                volume: row.get(5)?,
                sma50: row.get(6)?,
                sma200: row.get(7)?,
                price_to_book: row.get(8)?,
                bvps: row.get(9)?,
                enterprise_value: row.get(10)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// All events for `ticker`, ascending by (date, signal_type)
    ///
    /// `meta` is parsed back from its stored JSON text; text that is not JSON
    /// comes back as a JSON string.
    pub fn load_signal_events(&self, ticker: &str) -> Result<Vec<SignalEvent>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ticker, date, signal_type, meta
             FROM signal_events
             WHERE ticker = ?1
             ORDER BY date ASC, signal_type ASC",
        )?;

        let rows = stmt.query_map([ticker], |row| {
            let raw_type: String = row.get(2)?;
            let signal_type = SignalType::from_str(&raw_type).ok_or_else(|| {
                rusqlite::Error::InvalidColumnType(2, "signal_type".to_string(), rusqlite::types::Type::Text)
            })?;
            let raw_meta: String = row.get(3)?;
            let meta = serde_json::from_str(&raw_meta)
                .unwrap_or(serde_json::Value::String(raw_meta));

            Ok(SignalEvent {
                ticker: row.get(0)?,
                date: row.get(1)?,
                signal_type,
                meta,
            })
        })?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row?);
        }
        Ok(events)
    }

    pub fn count_metrics(&self, ticker: &str) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM daily_metrics WHERE ticker = ?1",
            [ticker],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn count_signal_events(&self, ticker: &str) -> Result<usize, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM signal_events WHERE ticker = ?1",
            [ticker],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl UpsertStore for SqliteStore {
    fn initialize(&mut self) -> Result<(), StoreError> {
        log::info!("🔧 Initializing schema");

        for (file, sql) in SCHEMA_FILES {
            self.conn
                .execute_batch(sql)
                .map_err(|source| StoreError::SchemaInit { file, source })?;
            log::debug!("   ├─ Applied: {}", file);
        }

        log::info!("✅ Schema ready ({} files)", SCHEMA_FILES.len());
        Ok(())
    }

    fn upsert_metrics(&mut self, ticker: &str, records: &[MetricRecord]) -> Result<usize, StoreError> {
        const OP: &str = "upsert_metrics";
        require_ticker(OP, ticker)?;

        if records.is_empty() {
            log::debug!("{}: empty metrics batch, nothing to write", ticker);
            return Ok(0);
        }

        let fail = |date: Option<NaiveDate>, source: TransactionFailure| StoreError::Transaction {
            op: OP,
            ticker: ticker.to_string(),
            date,
            source,
        };

        let tx = self.conn.transaction().map_err(|e| fail(None, e.into()))?;
        register_if_absent(&tx, ticker).map_err(|e| fail(None, e.into()))?;

        {
            let mut stmt = tx
                .prepare_cached(UPSERT_METRIC_SQL)
                .map_err(|e| fail(None, e.into()))?;

            for record in records {
                stmt.execute(params![
                    ticker,
                    record.date,
                    record.open,
                    record.high,
                    record.low,
                    record.close,
                    record.volume,
                    record.sma50,
                    record.sma200,
                    record.price_to_book,
                    record.bvps,
                    record.enterprise_value,
                ])
                .map_err(|e| fail(Some(record.date), e.into()))?;
            }
        }

        tx.commit().map_err(|e| fail(None, e.into()))?;

        log::info!("✅ Upserted {} daily metrics for {}", records.len(), ticker);
        Ok(records.len())
    }

    fn upsert_signal_events(&mut self, ticker: &str, events: &[SignalEvent]) -> Result<usize, StoreError> {
        const OP: &str = "upsert_signal_events";
        require_ticker(OP, ticker)?;

        if let Some(stray) = events.iter().find(|e| e.ticker != ticker) {
            return Err(StoreError::KeyMismatch {
                op: OP,
                expected: ticker.to_string(),
                found: stray.ticker.clone(),
            });
        }

        if events.is_empty() {
            log::debug!("{}: no signal events to write", ticker);
            return Ok(0);
        }

        let fail = |date: Option<NaiveDate>, source: TransactionFailure| StoreError::Transaction {
            op: OP,
            ticker: ticker.to_string(),
            date,
            source,
        };

        let tx = self.conn.transaction().map_err(|e| fail(None, e.into()))?;
        register_if_absent(&tx, ticker).map_err(|e| fail(None, e.into()))?;

        {
            let mut stmt = tx
                .prepare_cached(UPSERT_SIGNAL_SQL)
                .map_err(|e| fail(None, e.into()))?;

            for event in events {
                let meta = serde_json::to_string(&event.meta)
                    .map_err(|e| fail(Some(event.date), e.into()))?;

                stmt.execute(params![ticker, event.date, event.signal_type.as_str(), meta])
                    .map_err(|e| fail(Some(event.date), e.into()))?;
            }
        }

        tx.commit().map_err(|e| fail(None, e.into()))?;

        log::info!("✅ Upserted {} signal events for {}", events.len(), ticker);
        Ok(events.len())
    }
}

fn require_ticker(op: &'static str, ticker: &str) -> Result<(), StoreError> {
    if ticker.trim().is_empty() {
        return Err(StoreError::MissingKey { op, field: "ticker" });
    }
    Ok(())
}

/// First-encounter registry insert; an existing row is left untouched
fn register_if_absent(tx: &Transaction<'_>, ticker: &str) -> rusqlite::Result<()> {
    tx.execute(
        "INSERT INTO tickers (ticker, added_at, info) VALUES (?1, ?2, NULL)
         ON CONFLICT(ticker) DO NOTHING",
        params![ticker, now_rfc3339()],
    )?;
    Ok(())
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
