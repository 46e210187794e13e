//! Source adapter abstractions and implementations.
//!
//! This module contains:
//! - The `SourceAdapter` trait that all upstreams implement
//! - Adapter capabilities
//! - Concrete adapters (Yahoo, Alpha Vantage, Google Finance, synthetic)
//! - [`build_adapters`], which assembles the standard chain from settings

mod capabilities;
pub(crate) mod http;
mod traits;

pub mod alpha_vantage;
pub mod google;
pub mod synthetic;
pub mod yahoo;

use std::sync::Arc;
use std::time::Duration;

use log::info;

pub use alpha_vantage::AlphaVantageAdapter;
pub use capabilities::{AdapterCapabilities, DEFAULT_ADAPTER_TIMEOUT};
pub use google::GoogleFinanceAdapter;
pub use synthetic::{SyntheticAdapter, SyntheticValues};
pub use traits::SourceAdapter;
pub use yahoo::{YahooChartAdapter, YahooFundamentalsAdapter};

/// Which adapters make up the standard chain and how they are configured.
#[derive(Clone, Debug)]
pub struct AdapterSettings {
    /// Registers the Alpha Vantage adapter when set.
    pub alpha_vantage_api_key: Option<String>,
    /// Registers the Google Finance scraper.
    pub google_finance_enabled: bool,
    /// Registers the synthetic last-resort tier.
    pub synthetic_enabled: bool,
    /// Per-call timeout for every network adapter.
    pub adapter_timeout: Duration,
}

impl Default for AdapterSettings {
    fn default() -> Self {
        Self {
            alpha_vantage_api_key: None,
            google_finance_enabled: true,
            synthetic_enabled: true,
            adapter_timeout: DEFAULT_ADAPTER_TIMEOUT,
        }
    }
}

/// Build the standard adapter chain.
pub fn build_adapters(settings: &AdapterSettings) -> Vec<Arc<dyn SourceAdapter>> {
    let timeout = settings.adapter_timeout;
    let mut adapters: Vec<Arc<dyn SourceAdapter>> = vec![
        Arc::new(YahooChartAdapter::with_timeout(timeout)),
        Arc::new(YahooFundamentalsAdapter::with_timeout(timeout)),
    ];

    match settings.alpha_vantage_api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => {
            adapters.push(Arc::new(AlphaVantageAdapter::with_timeout(key.trim(), timeout)));
        }
        _ => info!("Alpha Vantage API key not configured, adapter disabled"),
    }

    if settings.google_finance_enabled {
        adapters.push(Arc::new(GoogleFinanceAdapter::with_timeout(timeout)));
    }

    if settings.synthetic_enabled {
        adapters.push(Arc::new(SyntheticAdapter::new()));
    }

    adapters
}
