use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;
use urlencoding::encode;

use super::models::YahooChartResponse;
use super::positive;
use crate::errors::MarketDataError;
use crate::models::{finite_decimal, round_money, AdapterQuote, Fundamentals, Tier};
use crate::provider::http::{build_client, check_status, transport_error, BROWSER_USER_AGENT};
use crate::provider::{AdapterCapabilities, SourceAdapter, DEFAULT_ADAPTER_TIMEOUT};
use crate::symbols::yahoo_symbol;

const PROVIDER_ID: &str = "YAHOO_CHART";
const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Decimal places kept on change fractions (0.0123 = +1.23%).
const CHANGE_PERCENT_DP: u32 = 4;

/// Price adapter over Yahoo's v8 chart endpoint.
///
/// The price is the last close of the intraday series, falling back to
/// `regularMarketPrice` and then `previousClose` from the chart metadata.
pub struct YahooChartAdapter {
    client: Client,
    timeout: Duration,
}

impl YahooChartAdapter {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_ADAPTER_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            timeout,
        }
    }
}

impl Default for YahooChartAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Turn a chart response into a price quote.
pub(crate) fn parse_chart(
    symbol: &str,
    response: YahooChartResponse,
    fetched_at: DateTime<Utc>,
) -> Result<AdapterQuote, MarketDataError> {
    if let Some(error) = response.chart.error {
        if error.code.as_deref() == Some("Not Found") {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }
        return Err(MarketDataError::provider(
            PROVIDER_ID,
            error.description.unwrap_or_else(|| "chart error".to_string()),
        ));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketDataError::parse(PROVIDER_ID, "no chart result"))?;

    let meta = result
        .meta
        .ok_or_else(|| MarketDataError::parse(PROVIDER_ID, "missing chart meta"))?;

    let last_close = result
        .indicators
        .and_then(|i| i.quote)
        .and_then(|q| q.into_iter().next())
        .and_then(|q| q.close)
        .and_then(|closes| closes.last().copied().flatten());

    let current = positive(last_close)
        .or(positive(meta.regular_market_price))
        .or(positive(meta.previous_close))
        .ok_or_else(|| MarketDataError::NoUsablePrice {
            provider: PROVIDER_ID.to_string(),
        })?;

    let previous = positive(meta.previous_close)
        .or(positive(meta.chart_previous_close))
        .or(positive(meta.regular_market_previous_close))
        .unwrap_or(current);

    let current_d = finite_decimal(current).ok_or_else(|| MarketDataError::NoUsablePrice {
        provider: PROVIDER_ID.to_string(),
    })?;
    let previous_d = finite_decimal(previous).unwrap_or(current_d);

    let change = current_d - previous_d;
    let change_percent = if previous_d > Decimal::ZERO {
        (change / previous_d)
            .round_dp_with_strategy(CHANGE_PERCENT_DP, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };

    let mut quote = AdapterQuote::price(
        symbol,
        round_money(current_d),
        round_money(change),
        change_percent,
        fetched_at,
    );
    quote.fundamentals = Fundamentals {
        market_cap: positive(meta.market_cap).and_then(finite_decimal),
        ..Default::default()
    };
    Ok(quote)
}

#[async_trait]
impl SourceAdapter for YahooChartAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn tier(&self) -> Tier {
        Tier::Primary
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::PRICE_ONLY
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, symbol: &str) -> Result<AdapterQuote, MarketDataError> {
        let yahoo = yahoo_symbol(symbol);
        let url = format!("{}/{}", BASE_URL, encode(&yahoo));
        debug!("Fetching Yahoo chart for {} ({})", symbol, yahoo);

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_ID, e))?;

        let response = check_status(PROVIDER_ID, symbol, response)?;

        let body: YahooChartResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::parse(PROVIDER_ID, e.to_string()))?;

        parse_chart(symbol, body, Utc::now())
    }
}
