//! Monitoring facade consumed by the HTTP layer.
//!
//! Wires the store, the configured targets and the scheduler together and
//! exposes the read and control operations of the service.

use crate::config::{ServerConfig, Target};
use crate::db::{CheckStore, DbError};
use crate::probe::ProbeError;
use crate::scheduler::{sweep_expired, Scheduler, SweepReport};
use crate::status::{
    history, latest_status, overall_status, target_status, StatusOverview, TargetStatus,
    UptimeBucket,
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by monitor operations.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("unknown target: {0}")]
    UnknownTarget(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Result of a health probe of the service itself.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub database_connected: bool,
    pub monitoring_active: bool,
    pub timestamp: DateTime<Utc>,
}

pub struct Monitor {
    store: Arc<dyn CheckStore>,
    targets: Vec<Target>,
    scheduler: Arc<Scheduler>,
    retention_days: i64,
}

impl Monitor {
    pub fn new(
        store: Arc<dyn CheckStore>,
        targets: Vec<Target>,
        scheduler: Arc<Scheduler>,
        retention_days: i64,
    ) -> Self {
        Self {
            store,
            targets,
            scheduler,
            retention_days,
        }
    }

    /// Build the monitor and its stopped scheduler from configuration.
    pub fn from_config(cfg: &ServerConfig, store: Arc<dyn CheckStore>) -> Result<Self, ProbeError> {
        let scheduler = Scheduler::new(
            store.clone(),
            cfg.targets.clone(),
            cfg.check_interval,
            cfg.probe_timeout,
        )?;

        Ok(Self::new(
            store,
            cfg.targets.clone(),
            Arc::new(scheduler),
            cfg.retention_days,
        ))
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// Latest status of every target plus the overall label.
    pub fn get_all_status(&self) -> Result<StatusOverview, MonitorError> {
        let now = Utc::now();
        let statuses = latest_status(self.store.as_ref(), &self.targets, now)?;
        let overall = overall_status(statuses.iter().map(|s| s.status));

        Ok(StatusOverview {
            websites: statuses
                .into_iter()
                .map(|s| (s.website.clone(), s))
                .collect(),
            overall,
            last_updated: now,
        })
    }

    /// Latest status of one configured target.
    pub fn get_target_status(&self, name: &str) -> Result<TargetStatus, MonitorError> {
        let target = self
            .targets
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| MonitorError::UnknownTarget(name.to_string()))?;

        Ok(target_status(self.store.as_ref(), target, Utc::now())?)
    }

    /// The 24 trailing hourly uptime buckets.
    pub fn get_uptime_history(&self) -> Result<Vec<UptimeBucket>, MonitorError> {
        Ok(history(self.store.as_ref(), &self.targets, Utc::now())?)
    }

    /// Kick off one out-of-band cycle and return without waiting for it.
    pub fn trigger_immediate_check(&self) {
        let handle = self.scheduler.force_check();
        tokio::spawn(async move {
            if let Err(e) = handle.await {
                tracing::error!("Immediate check failed: {}", e);
            }
        });
    }

    /// Delete check results past the retention threshold.
    pub fn run_retention_sweep(&self) -> Result<SweepReport, MonitorError> {
        Ok(sweep_expired(
            self.store.as_ref(),
            self.retention_days,
            Utc::now(),
        )?)
    }

    pub fn is_monitoring_active(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn health(&self) -> HealthReport {
        let database_connected = match self.store.ping() {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Health check failed: {}", e);
                false
            }
        };

        HealthReport {
            database_connected,
            monitoring_active: self.is_monitoring_active(),
            timestamp: Utc::now(),
        }
    }
}
