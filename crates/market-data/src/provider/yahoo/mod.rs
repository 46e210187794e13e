//! Yahoo Finance source adapters.
//!
//! Two adapters share this module:
//! - [`YahooChartAdapter`]: prices from the v8 chart endpoint (no auth)
//! - [`YahooFundamentalsAdapter`]: P/E and EPS from the v10 quoteSummary
//!   endpoint, which needs a cookie + crumb pair

mod chart;
mod fundamentals;
mod models;

pub use chart::YahooChartAdapter;
pub use fundamentals::YahooFundamentalsAdapter;

use std::sync::RwLock;

use reqwest::{header, Client};

use crate::errors::MarketDataError;
use crate::provider::http::{transport_error, BROWSER_USER_AGENT};

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Yahoo authentication pair.
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

/// Crumb cache owned by one adapter instance.
///
/// The crumb is fetched lazily on first use and dropped when Yahoo answers
/// 401, so the next call fetches a fresh one.
#[derive(Default)]
struct CrumbSession {
    crumb: RwLock<Option<CrumbData>>,
}

impl CrumbSession {
    /// Return the cached crumb or fetch a new one.
    async fn ensure(&self, client: &Client, provider: &str) -> Result<CrumbData, MarketDataError> {
        {
            let guard = self.crumb.read().unwrap_or_else(|e| e.into_inner());
            if let Some(crumb) = guard.as_ref() {
                return Ok(crumb.clone());
            }
        }
        let fresh = Self::fetch(client, provider).await?;
        let mut guard = self.crumb.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(fresh.clone());
        Ok(fresh)
    }

    async fn fetch(client: &Client, provider: &str) -> Result<CrumbData, MarketDataError> {
        // Step 1: cookie from fc.yahoo.com (the response status is irrelevant)
        let response = client
            .get(COOKIE_URL)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| MarketDataError::provider(provider, "Failed to parse Yahoo cookie"))?;

        // Step 2: crumb using the cookie
        let crumb = client
            .get(CRUMB_URL)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| transport_error(provider, e))?
            .text()
            .await
            .map_err(|e| {
                MarketDataError::provider(provider, format!("Failed to read crumb: {}", e))
            })?;

        let crumb = crumb.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') {
            return Err(MarketDataError::provider(provider, "Yahoo returned an invalid crumb"));
        }

        Ok(CrumbData { cookie, crumb })
    }

    fn clear(&self) {
        let mut guard = self.crumb.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }
}

/// A positive, finite float, or `None`. Yahoo uses 0 for "unknown".
fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}
