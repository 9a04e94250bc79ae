//! Per-target latest status and the overall system status.

use crate::config::Target;
use crate::db::{CheckResult, CheckStore, Classification, DbError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Latest known state of one target, shaped for presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStatus {
    pub website: String,
    pub status: Classification,
    pub response_time: u64,
    pub last_checked: DateTime<Utc>,
    pub status_code: u16,
}

impl TargetStatus {
    /// Placeholder for a target with no history yet.
    pub fn checking(target: &str, now: DateTime<Utc>) -> Self {
        Self {
            website: target.to_string(),
            status: Classification::Checking,
            response_time: 0,
            last_checked: now,
            status_code: 0,
        }
    }

    /// Offline with zero latency, used when a result could not be recorded.
    pub fn offline(target: &str, now: DateTime<Utc>) -> Self {
        Self {
            website: target.to_string(),
            status: Classification::Offline,
            response_time: 0,
            last_checked: now,
            status_code: 0,
        }
    }
}

impl From<CheckResult> for TargetStatus {
    fn from(r: CheckResult) -> Self {
        Self {
            website: r.target,
            status: r.status,
            response_time: r.response_time_ms,
            last_checked: r.checked_at,
            status_code: r.status_code,
        }
    }
}

/// System-wide label aggregated across all targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Operational,
    Degraded,
    Outage,
    Checking,
}

/// Snapshot of every configured target plus the overall label.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOverview {
    pub websites: BTreeMap<String, TargetStatus>,
    pub overall: OverallStatus,
    pub last_updated: DateTime<Utc>,
}

/// Latest status of one target; `checking` when it has no history.
pub fn target_status(
    store: &dyn CheckStore,
    target: &Target,
    now: DateTime<Utc>,
) -> Result<TargetStatus, DbError> {
    Ok(match store.query_latest(&target.name)? {
        Some(latest) => latest.into(),
        None => TargetStatus::checking(&target.name, now),
    })
}

/// Latest status of every target, in configuration order.
pub fn latest_status(
    store: &dyn CheckStore,
    targets: &[Target],
    now: DateTime<Utc>,
) -> Result<Vec<TargetStatus>, DbError> {
    targets
        .iter()
        .map(|target| target_status(store, target, now))
        .collect()
}

/// Aggregate per-target classifications into one overall label.
///
/// Rules are evaluated in order; a mix of `offline` and `checking` is
/// `degraded`, not `checking`. An empty set counts as operational.
pub fn overall_status<I>(statuses: I) -> OverallStatus
where
    I: IntoIterator<Item = Classification>,
{
    let statuses: Vec<Classification> = statuses.into_iter().collect();
    let all = |c: Classification| statuses.iter().all(|s| *s == c);
    let any = |c: Classification| statuses.iter().any(|s| *s == c);

    if all(Classification::Online) {
        OverallStatus::Operational
    } else if all(Classification::Offline) {
        OverallStatus::Outage
    } else if any(Classification::Offline) || any(Classification::Degraded) {
        OverallStatus::Degraded
    } else {
        OverallStatus::Checking
    }
}
