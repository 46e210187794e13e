//! Shared HTTP plumbing for the network adapters.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};

use crate::errors::MarketDataError;

/// Browser-like agent string; Yahoo and Google reject bare clients.
pub(crate) const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Build a client with a transport-level timeout.
///
/// The resolver enforces its own per-call timeout as well; this one only
/// guards against connections that never complete.
pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Map a transport error onto the adapter error taxonomy.
pub(crate) fn transport_error(provider: &str, e: reqwest::Error) -> MarketDataError {
    if e.is_timeout() {
        MarketDataError::Timeout {
            provider: provider.to_string(),
        }
    } else {
        MarketDataError::provider(provider, e.to_string())
    }
}

/// Reject non-success statuses with the matching error variant.
pub(crate) fn check_status(
    provider: &str,
    symbol: &str,
    response: Response,
) -> Result<Response, MarketDataError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(status_error(provider, symbol, status))
}

pub(crate) fn status_error(provider: &str, symbol: &str, status: StatusCode) -> MarketDataError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => MarketDataError::RateLimited {
            provider: provider.to_string(),
        },
        StatusCode::NOT_FOUND => MarketDataError::SymbolNotFound(symbol.to_string()),
        other => MarketDataError::provider(provider, format!("HTTP {}", other)),
    }
}
