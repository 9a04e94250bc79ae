//! Database module for Siteward.
//!
//! Provides SQLite storage with embedded migrations behind the [`CheckStore`]
//! interface consumed by the scheduler and the status readers.

mod models;
mod store;

pub use models::*;
pub use store::*;

use chrono::{DateTime, Utc};

/// Persistence interface for check results.
///
/// Implementations must allow independent appends for different targets and
/// range reads without a global ordering requirement.
pub trait CheckStore: Send + Sync {
    /// Append one result and return its row ID.
    fn append(&self, result: &CheckResult) -> Result<i64, DbError>;

    /// Most recent result for a target by check time.
    fn query_latest(&self, target: &str) -> Result<Option<CheckResult>, DbError>;

    /// Results for a target with `start <= checked_at < end`, oldest first.
    fn query_range(
        &self,
        target: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CheckResult>, DbError>;

    /// Delete results created before the cutoff and return how many went.
    fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, DbError>;

    /// Cheap round trip used for health reporting.
    fn ping(&self) -> Result<(), DbError>;
}
