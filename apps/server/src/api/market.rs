use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use folioboard_core::PortfolioServiceTrait;
use folioboard_market_data::QuoteResult;
use serde::Serialize;

use super::bypass_cache;
use crate::{error::ApiResult, main_lib::AppState};

#[derive(Serialize)]
struct QuoteEnvelope {
    success: bool,
    data: QuoteResult,
    timestamp: DateTime<Utc>,
}

async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Json<QuoteEnvelope>> {
    let data = state
        .portfolio_service
        .quote(&symbol, bypass_cache(&headers))
        .await?;
    Ok(Json(QuoteEnvelope {
        success: true,
        data,
        timestamp: Utc::now(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/market/{symbol}", get(get_quote))
}
