use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use folioboard_core::refresh::{RefreshState, SchedulerState};
use serde::Serialize;

use crate::main_lib::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshStatus {
    state: RefreshState,
    scheduler_state: SchedulerState,
    auto_refresh: bool,
    stale: bool,
    tick_interval_ms: u64,
}

async fn get_refresh_state(State(state): State<Arc<AppState>>) -> Json<RefreshStatus> {
    let scheduler = &state.scheduler;
    let refresh_state = scheduler.state();
    let tick_interval_ms = u64::try_from(scheduler.tick_interval().as_millis()).unwrap_or(u64::MAX);
    Json(RefreshStatus {
        scheduler_state: refresh_state.scheduler_state(),
        state: refresh_state,
        auto_refresh: scheduler.auto_refresh_enabled(),
        stale: scheduler.is_stale(),
        tick_interval_ms,
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/refresh/state", get(get_refresh_state))
}
