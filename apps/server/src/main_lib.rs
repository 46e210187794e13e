use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use folioboard_core::{
    default_holdings, parse_holdings,
    quotes::{BatchOrchestrator, OrchestratorConfig, ResultCache},
    refresh::RefreshScheduler,
    settings::PreferencesStore,
    utils::{Clock, SystemClock},
    Holding, PortfolioService,
};
use folioboard_market_data::{build_adapters, AdapterSettings, FallbackResolver, SourceAdapter};

use crate::config::Config;

pub struct AppState {
    pub portfolio_service: Arc<PortfolioService>,
    pub scheduler: Arc<RefreshScheduler>,
    pub preferences: Arc<PreferencesStore>,
}

pub fn init_tracing() {
    let log_format = std::env::var("FB_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Build the state with the standard adapter chain.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let adapters = build_adapters(&AdapterSettings {
        alpha_vantage_api_key: config.alpha_vantage_api_key.clone(),
        google_finance_enabled: config.google_finance_enabled,
        synthetic_enabled: true,
        adapter_timeout: config.adapter_timeout,
    });
    build_state_with(config, adapters).await
}

/// Build the state around an explicit adapter chain.
pub async fn build_state_with(
    config: &Config,
    adapters: Vec<Arc<dyn SourceAdapter>>,
) -> anyhow::Result<Arc<AppState>> {
    let chain: Vec<&str> = adapters.iter().map(|a| a.id()).collect();
    tracing::info!("Adapter chain: {}", chain.join(" -> "));

    let holdings = match &config.holdings_seed {
        Some(path) => load_seed(path).await?,
        None => default_holdings(),
    };
    tracing::info!("Loaded {} holdings", holdings.len());

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = Arc::new(ResultCache::new(clock.clone()));
    let orchestrator = BatchOrchestrator::new(
        Arc::new(FallbackResolver::new(adapters)),
        cache,
        OrchestratorConfig {
            batch_size: config.batch_size,
            inter_batch_delay: config.batch_delay,
            cache_ttl: config.cache_ttl,
        },
    );
    let portfolio_service = Arc::new(PortfolioService::new(holdings, orchestrator));

    let preferences = Arc::new(PreferencesStore::open(&config.preferences_path));
    let prefs = preferences.get();
    tracing::info!(
        "Preferences from {}: auto-refresh {}, interval {} ms",
        preferences.path().display(),
        prefs.auto_refresh,
        prefs.refresh_interval_ms
    );

    let scheduler = Arc::new(RefreshScheduler::new(
        portfolio_service.clone(),
        clock,
        config.staleness.clone(),
        prefs.refresh_interval(),
    ));
    scheduler.set_auto_refresh(prefs.auto_refresh);

    Ok(Arc::new(AppState {
        portfolio_service,
        scheduler,
        preferences,
    }))
}

async fn load_seed(path: &Path) -> anyhow::Result<Vec<Holding>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read holdings seed {}", path.display()))?;
    let body: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Holdings seed {} is not valid JSON", path.display()))?;
    let holdings = parse_holdings(&body)
        .with_context(|| format!("Holdings seed {} is invalid", path.display()))?;
    Ok(holdings)
}
