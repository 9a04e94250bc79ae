//! Scheduler module for running periodic probe cycles.

mod retention;

pub use retention::*;

use crate::config::Target;
use crate::db::{CheckResult, CheckStore};
use crate::probe::{HttpProber, ProbeError};
use crate::status::TargetStatus;

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// Lifecycle of the periodic probe loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

/// Drives probe cycles over all configured targets.
///
/// The loop task is owned through an explicit handle; `stop` signals it and
/// waits for it to finish.
pub struct Scheduler {
    inner: Arc<CycleRunner>,
    state: watch::Sender<SchedulerState>,
    task: Mutex<Option<JoinHandle<()>>>,
}

/// State shared between the loop task and out-of-band checks.
struct CycleRunner {
    store: Arc<dyn CheckStore>,
    targets: Vec<Target>,
    prober: HttpProber,
    interval: Duration,
}

impl Scheduler {
    /// Create a stopped scheduler.
    pub fn new(
        store: Arc<dyn CheckStore>,
        targets: Vec<Target>,
        interval: Duration,
        probe_timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let (state, _) = watch::channel(SchedulerState::Stopped);

        Ok(Self {
            inner: Arc::new(CycleRunner {
                store,
                targets,
                prober: HttpProber::new(probe_timeout)?,
                interval,
            }),
            state,
            task: Mutex::new(None),
        })
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    /// Start the periodic loop. Does nothing if it is already running.
    pub async fn start(&self) {
        let mut task = self.task.lock().await;
        if task.is_some() {
            tracing::warn!("Scheduler: already running");
            return;
        }

        tracing::info!(
            "Starting website monitoring for {} targets every {:?}",
            self.inner.targets.len(),
            self.inner.interval
        );

        self.state.send_replace(SchedulerState::Running);
        let runner = self.inner.clone();
        let state_rx = self.state.subscribe();
        *task = Some(tokio::spawn(run_loop(runner, state_rx)));
    }

    /// Stop the loop and wait for it to exit.
    ///
    /// An in-flight cycle is allowed to finish, so this returns within one
    /// probe timeout. The task lock is held until the loop has exited, so a
    /// concurrent `start` only spawns once the old loop is gone.
    pub async fn stop(&self) {
        let mut task = self.task.lock().await;
        self.state.send_replace(SchedulerState::Stopped);

        let Some(handle) = task.take() else {
            return;
        };

        tracing::info!("Stopping website monitoring...");
        if let Err(e) = handle.await {
            if !e.is_cancelled() {
                tracing::error!("Scheduler: monitoring task failed: {}", e);
            }
        }
    }

    /// Probe every target once and persist the results.
    pub async fn run_cycle(&self) -> Vec<TargetStatus> {
        self.inner.run_cycle().await
    }

    /// Run one cycle in a detached task without touching the periodic loop.
    pub fn force_check(&self) -> JoinHandle<Vec<TargetStatus>> {
        let runner = self.inner.clone();
        tokio::spawn(async move { runner.run_cycle().await })
    }
}

/// Periodic loop: run a cycle, then sleep until the interval elapses or a
/// stop is requested.
async fn run_loop(runner: Arc<CycleRunner>, mut state: watch::Receiver<SchedulerState>) {
    loop {
        if *state.borrow_and_update() == SchedulerState::Stopped {
            break;
        }

        runner.run_cycle().await;

        tokio::select! {
            _ = tokio::time::sleep(runner.interval) => {}
            _ = state.wait_for(|s| *s == SchedulerState::Stopped) => break,
        }
    }

    tracing::info!("Website monitoring stopped");
}

impl CycleRunner {
    /// Probe all targets concurrently. Always yields one status per target,
    /// in configuration order.
    async fn run_cycle(self: &Arc<Self>) -> Vec<TargetStatus> {
        let handles: Vec<_> = self
            .targets
            .iter()
            .map(|target| {
                let runner = self.clone();
                let target = target.clone();
                tokio::spawn(async move { runner.check_target(&target).await })
            })
            .collect();

        let mut statuses = Vec::with_capacity(handles.len());
        for (handle, target) in handles.into_iter().zip(&self.targets) {
            match handle.await {
                Ok(status) => statuses.push(status),
                Err(e) => {
                    tracing::error!("Error processing {}: {}", target.name, e);
                    statuses.push(TargetStatus::offline(&target.name, Utc::now()));
                }
            }
        }

        statuses
    }

    async fn check_target(&self, target: &Target) -> TargetStatus {
        let outcome = self.prober.probe(&target.url).await;
        let result = CheckResult::new(
            &target.name,
            outcome.status,
            outcome.response_time_ms,
            outcome.status_code,
            Utc::now(),
        );

        match self.store.append(&result) {
            Ok(_) => {
                tracing::info!(
                    "Checked {}: {} ({}ms)",
                    target.name,
                    result.status,
                    result.response_time_ms
                );
                result.into()
            }
            Err(e) => {
                tracing::error!("Failed to record check for {}: {}", target.name, e);
                TargetStatus::offline(&target.name, result.checked_at)
            }
        }
    }
}
