use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use folioboard_core::settings::{SchedulerPreferences, SchedulerPreferencesUpdate};

use crate::{error::ApiResult, main_lib::AppState};

async fn get_preferences(State(state): State<Arc<AppState>>) -> Json<SchedulerPreferences> {
    Json(state.preferences.get())
}

/// Persist the update and reconfigure the running scheduler.
async fn update_preferences(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SchedulerPreferencesUpdate>,
) -> ApiResult<Json<SchedulerPreferences>> {
    let prefs = state.preferences.update(update)?;
    state.scheduler.set_auto_refresh(prefs.auto_refresh);
    state.scheduler.set_tick_interval(prefs.refresh_interval());
    Ok(Json(prefs))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/preferences", get(get_preferences).put(update_preferences))
}
