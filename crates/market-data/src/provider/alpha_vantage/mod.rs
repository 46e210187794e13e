//! Alpha Vantage source adapter.
//!
//! Prices come from the `GLOBAL_QUOTE` endpoint with symbols mapped to the
//! `.BSE` notation. The adapter is only registered when an API key is
//! configured.
//!
//! Note: Alpha Vantage free tier is limited to 5 API calls per minute, so the
//! adapter asks the resolver for 12 seconds between calls.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::{header, Client};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{round_money, AdapterQuote, Tier};
use crate::provider::http::{build_client, check_status, transport_error};
use crate::provider::{AdapterCapabilities, SourceAdapter, DEFAULT_ADAPTER_TIMEOUT};
use crate::symbols::alpha_vantage_symbol;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";
const USER_AGENT: &str = "Portfolio-Dashboard/1.0";

/// Minimum spacing between two calls (5 calls per minute).
pub const ALPHA_VANTAGE_SPACING: Duration = Duration::from_secs(12);

/// Alpha Vantage price adapter.
pub struct AlphaVantageAdapter {
    client: Client,
    api_key: String,
    timeout: Duration,
}

// ============================================================================
// Response structures for Alpha Vantage API
// ============================================================================

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote")]
    global_quote: Option<GlobalQuote>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

/// Alpha Vantage returns every number as a string.
#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "09. change")]
    change: Option<String>,
    #[serde(rename = "10. change percent")]
    change_percent: Option<String>,
}

// ============================================================================
// Implementation
// ============================================================================

impl AlphaVantageAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_key, DEFAULT_ADAPTER_TIMEOUT)
    }

    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Check the body-level error fields Alpha Vantage uses instead of HTTP
    /// statuses.
    fn check_api_error(
        symbol: &str,
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(ref msg) = error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
            }
            return Err(MarketDataError::provider(PROVIDER_ID, msg.clone()));
        }

        // "Note" and "Information" are how the free tier reports throttling
        for msg in [note, information].into_iter().flatten() {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage notice: {}", msg);
        }

        Ok(())
    }

    /// Parse a numeric string, tolerating surrounding whitespace and a
    /// trailing percent sign.
    fn parse_number(value: &Option<String>) -> Option<Decimal> {
        let s = value.as_deref()?.trim().trim_end_matches('%').trim();
        Decimal::from_str(s).ok()
    }

    fn parse_global_quote(
        symbol: &str,
        body: GlobalQuoteResponse,
        fetched_at: DateTime<Utc>,
    ) -> Result<AdapterQuote, MarketDataError> {
        Self::check_api_error(symbol, &body.error_message, &body.note, &body.information)?;

        let quote = body
            .global_quote
            .ok_or_else(|| MarketDataError::parse(PROVIDER_ID, "missing Global Quote"))?;

        // An unknown symbol comes back as an empty "Global Quote" object
        let price = match Self::parse_number(&quote.price) {
            Some(p) if p > Decimal::ZERO => p,
            Some(_) => {
                return Err(MarketDataError::NoUsablePrice {
                    provider: PROVIDER_ID.to_string(),
                })
            }
            None => return Err(MarketDataError::SymbolNotFound(symbol.to_string())),
        };

        let change = Self::parse_number(&quote.change).unwrap_or(Decimal::ZERO);
        let change_percent = Self::parse_number(&quote.change_percent)
            .map(|p| p / Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO);

        Ok(AdapterQuote::price(
            symbol,
            round_money(price),
            round_money(change),
            change_percent,
            fetched_at,
        ))
    }
}

#[async_trait]
impl SourceAdapter for AlphaVantageAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn tier(&self) -> Tier {
        Tier::Primary
    }

    fn priority(&self) -> u8 {
        2
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::PRICE_ONLY
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn request_spacing(&self) -> Duration {
        ALPHA_VANTAGE_SPACING
    }

    async fn fetch(&self, symbol: &str) -> Result<AdapterQuote, MarketDataError> {
        let av_symbol = alpha_vantage_symbol(symbol);
        debug!("Fetching Alpha Vantage GLOBAL_QUOTE for {} ({})", symbol, av_symbol);

        let response = self
            .client
            .get(BASE_URL)
            .header(header::USER_AGENT, USER_AGENT)
            .query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", av_symbol.as_str()),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_ID, e))?;

        let response = check_status(PROVIDER_ID, symbol, response)?;

        let body: GlobalQuoteResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::parse(PROVIDER_ID, e.to_string()))?;

        Self::parse_global_quote(symbol, body, Utc::now())
    }
}
