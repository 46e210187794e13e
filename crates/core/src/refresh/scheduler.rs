//! Decides when to refresh and guarantees at most one refresh in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::refresh_model::{RefreshState, SchedulerState, StalenessPolicy, TriggerOutcome};
use super::refresh_traits::RefreshTarget;
use crate::errors::Result;
use crate::quotes::SourceClassification;
use crate::utils::Clock;

pub struct RefreshScheduler {
    target: Arc<dyn RefreshTarget>,
    clock: Arc<dyn Clock>,
    policy: StalenessPolicy,
    state: Arc<RwLock<RefreshState>>,
    auto_refresh: AtomicBool,
    tick_interval: RwLock<Duration>,
}

impl RefreshScheduler {
    pub fn new(
        target: Arc<dyn RefreshTarget>,
        clock: Arc<dyn Clock>,
        policy: StalenessPolicy,
        tick_interval: Duration,
    ) -> Self {
        Self {
            target,
            clock,
            policy,
            state: Arc::new(RwLock::new(RefreshState::default())),
            auto_refresh: AtomicBool::new(true),
            tick_interval: RwLock::new(tick_interval),
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).scheduler_state()
    }

    pub fn is_stale(&self) -> bool {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        self.policy.is_stale(&state, self.clock.now())
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        self.auto_refresh.store(enabled, Ordering::SeqCst);
        info!("Auto-refresh {}", if enabled { "enabled" } else { "disabled" });
    }

    pub fn auto_refresh_enabled(&self) -> bool {
        self.auto_refresh.load(Ordering::SeqCst)
    }

    pub fn set_tick_interval(&self, interval: Duration) {
        *self.tick_interval.write().unwrap_or_else(|e| e.into_inner()) = interval;
    }

    pub fn tick_interval(&self) -> Duration {
        *self.tick_interval.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a successful refresh that happened outside the scheduler,
    /// such as user-provided holdings.
    pub fn record_success(&self, classification: SourceClassification) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.last_success = Some(self.clock.now());
        state.last_provenance = Some(classification);
        state.last_error = None;
    }

    /// Forced refresh. Honored whenever no refresh is running.
    pub async fn trigger_manual(&self, bypass_cache: bool) -> TriggerOutcome {
        self.run(bypass_cache).await
    }

    /// Timer-driven refresh: runs only when auto-refresh is on and the last
    /// refresh is stale.
    pub async fn tick(&self) -> TriggerOutcome {
        if !self.auto_refresh_enabled() {
            return TriggerOutcome::AutoRefreshDisabled;
        }
        if !self.is_stale() {
            return TriggerOutcome::NotStale;
        }
        self.run(false).await
    }

    /// Spawn the timer loop.
    pub fn start(self: Arc<Self>, tick: Duration) -> SchedulerHandle {
        self.set_tick_interval(tick);
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            info!("Refresh scheduler started (tick {:?})", self.tick_interval());
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(self.tick_interval()) => {
                        let outcome = self.tick().await;
                        debug!("Scheduler tick: {:?}", outcome);
                    }
                    _ = stop_rx.changed() => break,
                }
            }
            info!("Refresh scheduler stopped");
        });

        SchedulerHandle { stop_tx, task }
    }

    /// Runs the refresh on its own task, so it completes even when the
    /// caller is dropped.
    async fn run(&self, bypass_cache: bool) -> TriggerOutcome {
        if !self.try_begin() {
            debug!("Refresh already in flight, skipping trigger");
            return TriggerOutcome::SkippedInFlight;
        }

        let mut guard = InFlightGuard {
            state: self.state.clone(),
            finished: false,
        };
        let target = self.target.clone();
        let clock = self.clock.clone();
        let task = tokio::spawn(async move {
            let result = target.run_refresh(bypass_cache).await;
            guard.finish(result, clock.now())
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => TriggerOutcome::Failed(format!("Refresh task failed: {}", e)),
        }
    }

    fn try_begin(&self) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.in_flight {
            return false;
        }
        state.in_flight = true;
        state.last_attempt = Some(self.clock.now());
        true
    }
}

/// Clears `in_flight` when the refresh task ends, however it ends. A task
/// that never reached `finish` is recorded as failed.
struct InFlightGuard {
    state: Arc<RwLock<RefreshState>>,
    finished: bool,
}

impl InFlightGuard {
    fn finish(
        &mut self,
        result: Result<SourceClassification>,
        now: DateTime<Utc>,
    ) -> TriggerOutcome {
        self.finished = true;
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.in_flight = false;
        match result {
            Ok(classification) => {
                state.last_success = Some(now);
                state.last_provenance = Some(classification);
                state.last_error = None;
                TriggerOutcome::Completed(classification)
            }
            Err(e) => {
                warn!("Refresh failed: {}", e);
                let message = e.to_string();
                state.last_provenance = Some(SourceClassification::SyntheticOnly);
                state.last_error = Some(message.clone());
                TriggerOutcome::Failed(message)
            }
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.in_flight = false;
        if !self.finished {
            warn!("Refresh task ended before completing");
            state.last_provenance = Some(SourceClassification::SyntheticOnly);
            state.last_error = Some("Refresh task ended before completing".to_string());
        }
    }
}

/// Handle to a running scheduler loop.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Ask the loop to end. A tick already running completes first.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop and wait for the loop to exit.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(e) = self.task.await {
            warn!("Refresh scheduler task ended abnormally: {}", e);
        }
    }
}
