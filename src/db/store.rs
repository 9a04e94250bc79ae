//! SQLite database store implementation.

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use super::models::*;
use super::CheckStore;

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("database connection lock poisoned")]
    Poisoned,
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

const SELECT_COLUMNS: &str =
    "SELECT id, target, status, response_time_ms, status_code, checked_at, created_at FROM check_results";

/// Thread-safe database store.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a new store with the given database path.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init()?;
        Ok(store)
    }

    /// Bring the schema up to date.
    fn init(&self) -> Result<(), DbError> {
        let mut conn = self.conn()?;
        let report = embedded::migrations::runner()
            .run(&mut *conn)
            .map_err(|e| DbError::Migration(e.to_string()))?;

        for migration in report.applied_migrations() {
            tracing::info!("Applied migration {}", migration);
        }
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    /// Total number of stored check results.
    #[cfg(test)]
    pub fn count_results(&self) -> Result<i64, DbError> {
        let conn = self.conn()?;
        Ok(conn.query_row("SELECT COUNT(*) FROM check_results", [], |r| r.get(0))?)
    }
}

impl CheckStore for Store {
    fn append(&self, result: &CheckResult) -> Result<i64, DbError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO check_results (target, status, response_time_ms, status_code, checked_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                result.target,
                result.status.as_str(),
                result.response_time_ms as i64,
                result.status_code as i64,
                format_db_time(result.checked_at),
                format_db_time(result.created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn query_latest(&self, target: &str) -> Result<Option<CheckResult>, DbError> {
        let conn = self.conn()?;
        let latest = conn
            .query_row(
                &format!(
                    "{} WHERE target = ?1 ORDER BY checked_at DESC, id DESC LIMIT 1",
                    SELECT_COLUMNS
                ),
                params![target],
                row_to_result,
            )
            .optional()?;
        Ok(latest)
    }

    fn query_range(
        &self,
        target: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CheckResult>, DbError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE target = ?1 AND checked_at >= ?2 AND checked_at < ?3 ORDER BY checked_at ASC, id ASC",
            SELECT_COLUMNS
        ))?;

        let results = stmt
            .query_map(
                params![target, format_db_time(start), format_db_time(end)],
                row_to_result,
            )?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(results)
    }

    fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, DbError> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM check_results WHERE created_at < ?1",
            params![format_db_time(cutoff)],
        )?;
        Ok(deleted)
    }

    fn ping(&self) -> Result<(), DbError> {
        let conn = self.conn()?;
        conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?;
        Ok(())
    }
}

fn row_to_result(row: &Row<'_>) -> SqlResult<CheckResult> {
    let status: String = row.get(2)?;
    let status = status.parse::<Classification>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into())
    })?;
    let response_time_ms: i64 = row.get(3)?;
    let status_code: i64 = row.get(4)?;

    Ok(CheckResult {
        id: row.get(0)?,
        target: row.get(1)?,
        status,
        response_time_ms: response_time_ms.max(0) as u64,
        status_code: u16::try_from(status_code).unwrap_or(0),
        checked_at: get_db_time(row, 5)?,
        created_at: get_db_time(row, 6)?,
    })
}

fn get_db_time(row: &Row<'_>, idx: usize) -> SqlResult<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    parse_db_time(&s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, format!("bad timestamp: {}", s).into())
    })
}

/// Fixed-width UTC text; sorts lexicographically in time order.
fn format_db_time(dt: DateTime<Utc>) -> String {
    dt.format(TIME_FORMAT).to_string()
}

/// Parse a datetime string from the database.
fn parse_db_time(s: &str) -> Option<DateTime<Utc>> {
    let formats = [TIME_FORMAT, "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

    for fmt in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(dt, Utc));
        }
    }

    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
