use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use folioboard_core::{
    refresh::TriggerOutcome, PortfolioServiceTrait, PortfolioView, SourceClassification,
};
use serde::Serialize;

use super::bypass_cache;
use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Serialize)]
struct PortfolioEnvelope {
    success: bool,
    #[serde(flatten)]
    view: PortfolioView,
}

impl From<PortfolioView> for PortfolioEnvelope {
    fn from(view: PortfolioView) -> Self {
        Self {
            success: true,
            view,
        }
    }
}

/// Refresh through the scheduler, then return the published view.
async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<PortfolioEnvelope>> {
    let bypass = bypass_cache(&headers);
    match state.scheduler.trigger_manual(bypass).await {
        TriggerOutcome::SkippedInFlight => {
            tracing::debug!("Refresh already running; serving last published view")
        }
        TriggerOutcome::Failed(reason) => tracing::warn!("Manual refresh failed: {}", reason),
        outcome => tracing::debug!("Manual refresh: {:?}", outcome),
    }
    Ok(Json(state.portfolio_service.current_view().into()))
}

/// Replace the holdings with a client-supplied array.
async fn replace_portfolio(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<PortfolioEnvelope>> {
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid holdings data: {}", e)))?;
    let view = state.portfolio_service.replace_holdings(&value)?;
    state
        .scheduler
        .record_success(SourceClassification::UserProvided);
    tracing::info!(
        "Holdings replaced by client ({} holdings)",
        view.data.holdings.len()
    );
    Ok(Json(view.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/portfolio", get(get_portfolio).post(replace_portfolio))
}
