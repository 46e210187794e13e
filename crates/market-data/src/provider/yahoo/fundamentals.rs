use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, StatusCode};
use tracing::{debug, warn};
use urlencoding::encode;

use super::models::{raw, YahooQuoteSummaryResponse};
use super::{positive, CrumbSession};
use crate::errors::MarketDataError;
use crate::models::{finite_decimal, round_money, AdapterQuote, Fundamentals, Tier};
use crate::provider::http::{build_client, check_status, transport_error, BROWSER_USER_AGENT};
use crate::provider::{AdapterCapabilities, SourceAdapter, DEFAULT_ADAPTER_TIMEOUT};
use crate::symbols::yahoo_symbol;

const PROVIDER_ID: &str = "YAHOO_FUNDAMENTALS";
const BASE_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const MODULES: &str = "defaultKeyStatistics,financialData,earningsHistory";

/// Fundamentals-only adapter over Yahoo's quoteSummary endpoint.
///
/// P/E is `trailingPE`, else `forwardPE`. EPS is the trailing EPS from key
/// statistics, else from financial data, else the most recent actual in the
/// earnings history. Zero values count as missing.
pub struct YahooFundamentalsAdapter {
    client: Client,
    timeout: Duration,
    session: CrumbSession,
}

impl YahooFundamentalsAdapter {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_ADAPTER_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            timeout,
            session: CrumbSession::default(),
        }
    }
}

impl Default for YahooFundamentalsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn parse_quote_summary(
    symbol: &str,
    response: YahooQuoteSummaryResponse,
    fetched_at: DateTime<Utc>,
) -> Result<AdapterQuote, MarketDataError> {
    let result = response
        .quote_summary
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

    let stats = result.default_key_statistics.as_ref();
    let financial = result.financial_data.as_ref();

    let pe_ratio = stats
        .and_then(|s| positive(raw(&s.trailing_pe)))
        .or_else(|| stats.and_then(|s| positive(raw(&s.forward_pe))));

    let latest_history_eps = result
        .earnings_history
        .as_ref()
        .and_then(|h| h.history.as_ref())
        .and_then(|entries| entries.iter().rev().find_map(|e| positive(raw(&e.eps_actual))));

    let eps = stats
        .and_then(|s| positive(raw(&s.trailing_eps)))
        .or_else(|| financial.and_then(|f| positive(raw(&f.trailing_eps))))
        .or(latest_history_eps);

    let fundamentals = Fundamentals {
        pe_ratio: pe_ratio.and_then(finite_decimal).map(round_money),
        latest_earnings: eps.and_then(finite_decimal).map(round_money),
        market_cap: None,
    };

    if !fundamentals.has_valuation() {
        return Err(MarketDataError::NoUsablePrice {
            provider: PROVIDER_ID.to_string(),
        });
    }

    Ok(AdapterQuote::fundamentals(symbol, fundamentals, fetched_at))
}

#[async_trait]
impl SourceAdapter for YahooFundamentalsAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn tier(&self) -> Tier {
        Tier::Primary
    }

    fn priority(&self) -> u8 {
        5
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::FUNDAMENTALS_ONLY
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, symbol: &str) -> Result<AdapterQuote, MarketDataError> {
        let crumb = self.session.ensure(&self.client, PROVIDER_ID).await?;
        let yahoo = yahoo_symbol(symbol);

        let url = format!(
            "{}/{}?modules={}&crumb={}",
            BASE_URL,
            encode(&yahoo),
            MODULES,
            encode(&crumb.crumb)
        );
        debug!("Fetching Yahoo fundamentals for {} ({})", symbol, yahoo);

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_ID, e))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Yahoo crumb rejected, clearing session");
            self.session.clear();
            return Err(MarketDataError::provider(
                PROVIDER_ID,
                "Yahoo authentication expired",
            ));
        }

        let response = check_status(PROVIDER_ID, symbol, response)?;

        let body: YahooQuoteSummaryResponse = response
            .json()
            .await
            .map_err(|e| MarketDataError::parse(PROVIDER_ID, e.to_string()))?;

        parse_quote_summary(symbol, body, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(json: &str) -> Result<AdapterQuote, MarketDataError> {
        let body: YahooQuoteSummaryResponse = serde_json::from_str(json).unwrap();
        parse_quote_summary("INFY", body, Utc::now())
    }

    #[test]
    fn test_trailing_values_preferred() {
        let q = parse(
            r#"{"quoteSummary":{"result":[{
                "defaultKeyStatistics":{"trailingPE":{"raw":24.567,"fmt":"24.57"},"forwardPE":{"raw":21.0},"trailingEps":{"raw":63.39}},
                "financialData":{"trailingEps":{"raw":60.0}}
            }],"error":null}}"#,
        )
        .unwrap();
        assert!(q.price.is_none());
        assert_eq!(q.fundamentals.pe_ratio, Some(dec!(24.57)));
        assert_eq!(q.fundamentals.latest_earnings, Some(dec!(63.39)));
    }

    #[test]
    fn test_forward_pe_and_history_fallbacks() {
        let q = parse(
            r#"{"quoteSummary":{"result":[{
                "defaultKeyStatistics":{"trailingPE":{},"forwardPE":{"raw":18.2},"trailingEps":{"raw":0}},
                "financialData":{},
                "earningsHistory":{"history":[{"epsActual":{"raw":15.1}},{"epsActual":{"raw":16.4}},{"epsActual":{}}]}
            }]}}"#,
        )
        .unwrap();
        assert_eq!(q.fundamentals.pe_ratio, Some(dec!(18.2)));
        assert_eq!(q.fundamentals.latest_earnings, Some(dec!(16.4)));
    }

    #[test]
    fn test_empty_modules_is_no_data() {
        let err = parse(r#"{"quoteSummary":{"result":[{"defaultKeyStatistics":{}}]}}"#).unwrap_err();
        assert!(matches!(err, MarketDataError::NoUsablePrice { .. }));
    }

    #[test]
    fn test_no_result_is_not_found() {
        let err = parse(r#"{"quoteSummary":{"result":null}}"#).unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(_)));
    }

    #[test]
    fn test_adapter_is_fundamentals_only() {
        let adapter = YahooFundamentalsAdapter::new();
        assert_eq!(adapter.capabilities(), AdapterCapabilities::FUNDAMENTALS_ONLY);
        assert_eq!(adapter.tier(), Tier::Primary);
    }
}
