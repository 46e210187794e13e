use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{config::Config, main_lib::AppState};

mod health;
mod market;
mod portfolio;
mod preferences;
mod refresh;

/// Header that forces live adapter calls for a request.
pub const BYPASS_CACHE_HEADER: &str = "x-bypass-cache";

/// True when the request carries `X-Bypass-Cache: true`.
pub(crate) fn bypass_cache(headers: &HeaderMap) -> bool {
    headers
        .get(BYPASS_CACHE_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let api = Router::new()
        .merge(health::router())
        .merge(portfolio::router())
        .merge(market::router())
        .merge(refresh::router())
        .merge(preferences::router());

    Router::new().nest("/api/v1", api).with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(cors)
            .layer(TimeoutLayer::new(config.request_timeout)),
    )
}
