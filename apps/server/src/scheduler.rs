//! Background tasks: the auto-refresh loop and the cache sweep.

use std::sync::Arc;
use std::time::Duration;

use folioboard_core::refresh::SchedulerHandle;
use folioboard_core::PortfolioServiceTrait;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::main_lib::AppState;

pub struct BackgroundTasks {
    refresh: SchedulerHandle,
    sweep: JoinHandle<()>,
}

impl BackgroundTasks {
    pub async fn shutdown(self) {
        self.sweep.abort();
        self.refresh.shutdown().await;
        info!("Background tasks stopped");
    }
}

/// Start the auto-refresh loop and the periodic cache sweep.
pub fn start_background_tasks(state: Arc<AppState>, sweep_every: Duration) -> BackgroundTasks {
    let tick = state.preferences.get().refresh_interval();
    let refresh = state.scheduler.clone().start(tick);
    let sweep = start_cache_sweep(state, sweep_every);
    BackgroundTasks { refresh, sweep }
}

fn start_cache_sweep(state: Arc<AppState>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Cache sweep started ({:?} interval)", every);
        let mut ticker = interval(every.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = state.portfolio_service.sweep_cache();
            if removed > 0 {
                debug!("Cache sweep removed {} expired entries", removed);
            }
        }
    })
}
