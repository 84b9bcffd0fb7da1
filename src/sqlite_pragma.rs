//! Connection PRAGMAs applied to every store connection

use rusqlite::Connection;
use std::time::Duration;

/// How long a writer waits on a locked database before failing
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Apply WAL journaling, NORMAL sync, foreign keys and a busy timeout
///
/// In-memory databases cannot use WAL; SQLite answers `memory` there and the
/// connection keeps working.
pub fn apply_optimized_pragmas(conn: &Connection) -> rusqlite::Result<()> {
    let journal_mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;

    log::debug!("📊 SQLite journal_mode={}", journal_mode);
    Ok(())
}
