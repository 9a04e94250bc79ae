//! Retention sweep for aged check results.

use crate::db::{CheckStore, DbError};

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// How often the background manager sweeps.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Rows removed by one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub check_results: usize,
}

/// Delete every check result created more than `retention_days` before `now`.
///
/// Idempotent; a sweep with nothing to delete reports zero. A threshold
/// reaching past the representable time range deletes nothing.
pub fn sweep_expired(
    store: &dyn CheckStore,
    retention_days: i64,
    now: DateTime<Utc>,
) -> Result<SweepReport, DbError> {
    let cutoff = ChronoDuration::try_days(retention_days)
        .and_then(|age| now.checked_sub_signed(age));

    let Some(cutoff) = cutoff else {
        tracing::warn!(
            "Retention of {} days is out of range; nothing to clean up",
            retention_days
        );
        return Ok(SweepReport { check_results: 0 });
    };

    let check_results = store.delete_older_than(cutoff)?;

    tracing::info!("Cleaned up {} old website status records", check_results);

    Ok(SweepReport { check_results })
}

/// Background task that sweeps on a fixed interval.
pub struct RetentionManager {
    store: Arc<dyn CheckStore>,
    retention_days: i64,
    stop: Mutex<Option<(broadcast::Sender<()>, JoinHandle<()>)>>,
}

impl RetentionManager {
    pub fn new(store: Arc<dyn CheckStore>, retention_days: i64) -> Self {
        Self {
            store,
            retention_days,
            stop: Mutex::new(None),
        }
    }

    /// Start the retention manager background task.
    pub async fn start(&self) {
        self.start_with_interval(SWEEP_INTERVAL).await;
    }

    async fn start_with_interval(&self, every: Duration) {
        let mut stop = self.stop.lock().await;
        if stop.is_some() {
            return;
        }

        let (tx, mut rx) = broadcast::channel(1);
        let store = self.store.clone();
        let retention_days = self.retention_days;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = rx.recv() => break,
                    _ = interval.tick() => {
                        if let Err(e) = sweep_expired(store.as_ref(), retention_days, Utc::now()) {
                            tracing::error!("RetentionManager: sweep failed: {}", e);
                        }
                    }
                }
            }
        });

        *stop = Some((tx, handle));
    }

    /// Stop the retention manager and wait for its task.
    pub async fn stop(&self) {
        let Some((tx, handle)) = self.stop.lock().await.take() else {
            return;
        };
        let _ = tx.send(());
        if let Err(e) = handle.await {
            tracing::error!("RetentionManager: task failed: {}", e);
        }
    }
}
