//! Trailing 24-hour uptime history.
//!
//! Windows are anchored to the current hour boundary at call time, so two
//! calls on either side of an hour boundary map bucket indexes to different
//! wall-clock hours.

use crate::config::Target;
use crate::db::{CheckStore, Classification, DbError};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;

/// Number of trailing hourly buckets.
pub const HISTORY_HOURS: usize = 24;

/// One trailing hourly window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UptimeBucket {
    /// Position in the trailing day; 23 is the current hour.
    pub hour: u8,
    /// 0-100, one decimal. 100.0 when the window has no checks.
    pub percentage: f64,
    /// Checks in the window that were not online.
    pub incidents: u64,
}

impl UptimeBucket {
    /// Bucket from raw counts across all targets.
    pub fn from_counts(hour: u8, total: u64, successes: u64) -> Self {
        let percentage = if total == 0 {
            100.0
        } else {
            round_one_decimal(successes as f64 / total as f64 * 100.0)
        };

        Self {
            hour,
            percentage,
            incidents: total.saturating_sub(successes),
        }
    }
}

/// Compute the 24 trailing hourly buckets ending at the hour containing `now`.
pub fn history(
    store: &dyn CheckStore,
    targets: &[Target],
    now: DateTime<Utc>,
) -> Result<Vec<UptimeBucket>, DbError> {
    let current_hour = truncate_to_window(now, 3600);
    let mut buckets = Vec::with_capacity(HISTORY_HOURS);

    for hour in 0..HISTORY_HOURS {
        let start = current_hour - ChronoDuration::hours((HISTORY_HOURS - 1 - hour) as i64);
        let end = start + ChronoDuration::hours(1);

        let mut total = 0u64;
        let mut successes = 0u64;
        for target in targets {
            let checks = store.query_range(&target.name, start, end)?;
            total += checks.len() as u64;
            successes += checks
                .iter()
                .filter(|c| c.status == Classification::Online)
                .count() as u64;
        }

        buckets.push(UptimeBucket::from_counts(hour as u8, total, successes));
    }

    Ok(buckets)
}

/// Truncate a datetime to the start of its containing window.
pub fn truncate_to_window(dt: DateTime<Utc>, window_seconds: i64) -> DateTime<Utc> {
    let ts = dt.timestamp();
    let truncated = ts - ts.rem_euclid(window_seconds);
    DateTime::from_timestamp(truncated, 0).unwrap_or(dt)
}

/// Ties go to the even digit, so 6.25 becomes 6.2.
fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round_ties_even() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_targets;
    use crate::db::{CheckResult, Store};
    use chrono::TimeZone;
    use Classification::*;

    #[test]
    fn test_truncate_to_window() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 1, 12, 34, 56).unwrap();
        assert_eq!(
            truncate_to_window(dt, 3600),
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(
            truncate_to_window(dt, 60),
            Utc.with_ymd_and_hms(2024, 1, 1, 12, 34, 0).unwrap()
        );
    }

    #[test]
    fn test_bucket_from_counts() {
        assert_eq!(
            UptimeBucket::from_counts(3, 0, 0),
            UptimeBucket { hour: 3, percentage: 100.0, incidents: 0 }
        );
        assert_eq!(UptimeBucket::from_counts(0, 3, 2).percentage, 66.7);
        assert_eq!(UptimeBucket::from_counts(0, 3, 2).incidents, 1);
        assert_eq!(UptimeBucket::from_counts(0, 6, 1).percentage, 16.7);
        assert_eq!(UptimeBucket::from_counts(0, 4, 0).percentage, 0.0);
        // Exact halves round to even.
        assert_eq!(UptimeBucket::from_counts(0, 16, 1).percentage, 6.2);
        assert_eq!(UptimeBucket::from_counts(0, 16, 3).percentage, 18.8);
        assert_eq!(UptimeBucket::from_counts(0, 8, 3).percentage, 37.5);
        // Never negative, even with inconsistent counts.
        assert_eq!(UptimeBucket::from_counts(0, 1, 2).incidents, 0);
    }

    #[test]
    fn test_history_empty_store() {
        let store = Store::new(":memory:").unwrap();
        let targets = parse_targets("https://a.example,https://b.example");

        let buckets = history(&store, &targets, Utc::now()).unwrap();
        assert_eq!(buckets.len(), HISTORY_HOURS);
        for (i, b) in buckets.iter().enumerate() {
            assert_eq!(b.hour as usize, i);
            assert_eq!(b.percentage, 100.0);
            assert_eq!(b.incidents, 0);
        }
    }

    #[test]
    fn test_history_aggregates_across_targets() {
        let store = Store::new(":memory:").unwrap();
        let targets = parse_targets("https://a.example,https://b.example");
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 15, 20, 0).unwrap();

        // Current hour (index 23): a online twice, b degraded once.
        let in_current = Utc.with_ymd_and_hms(2024, 6, 10, 15, 5, 0).unwrap();
        store.append(&CheckResult::new("a.example", Online, 10, 200, in_current)).unwrap();
        store.append(&CheckResult::new("a.example", Online, 10, 200, in_current)).unwrap();
        store.append(&CheckResult::new("b.example", Degraded, 10, 404, in_current)).unwrap();

        // Exactly on the boundary of 14:00 belongs to index 22.
        let boundary = Utc.with_ymd_and_hms(2024, 6, 10, 14, 0, 0).unwrap();
        store.append(&CheckResult::new("b.example", Offline, 0, 0, boundary)).unwrap();

        // 23 hours before the current hour is index 0; older data is ignored.
        let oldest = Utc.with_ymd_and_hms(2024, 6, 9, 16, 59, 59).unwrap();
        store.append(&CheckResult::new("a.example", Online, 10, 200, oldest)).unwrap();
        let too_old = Utc.with_ymd_and_hms(2024, 6, 9, 15, 59, 59).unwrap();
        store.append(&CheckResult::new("a.example", Offline, 0, 0, too_old)).unwrap();

        // Checks for unconfigured targets are not counted.
        store.append(&CheckResult::new("c.example", Offline, 0, 0, in_current)).unwrap();

        let buckets = history(&store, &targets, now).unwrap();
        assert_eq!(buckets.len(), HISTORY_HOURS);
        assert_eq!(buckets[23], UptimeBucket { hour: 23, percentage: 66.7, incidents: 1 });
        assert_eq!(buckets[22], UptimeBucket { hour: 22, percentage: 0.0, incidents: 1 });
        assert_eq!(buckets[0], UptimeBucket { hour: 0, percentage: 100.0, incidents: 0 });
        for b in &buckets[1..22] {
            assert_eq!(b.percentage, 100.0);
            assert_eq!(b.incidents, 0);
        }
    }
}
