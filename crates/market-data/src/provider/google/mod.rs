//! Google Finance scraping adapter.
//!
//! Google Finance has no public API. The quote page is fetched as HTML and
//! price, P/E and EPS are pulled out with a list of patterns tried in order.
//! The NSE page is tried first, then BOM.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use reqwest::{header, Client};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{round_money, AdapterQuote, Fundamentals, Tier};
use crate::provider::http::{build_client, status_error, transport_error, BROWSER_USER_AGENT};
use crate::provider::{AdapterCapabilities, SourceAdapter, DEFAULT_ADAPTER_TIMEOUT};
use crate::symbols::google_symbols;

const PROVIDER_ID: &str = "GOOGLE_FINANCE";
const BASE_URL: &str = "https://www.google.com/finance/quote";

/// P/E values outside (0, MAX_PE) are page noise, not ratios.
const MAX_PE: f64 = 1000.0;

lazy_static! {
    static ref PRICE_PATTERNS: Vec<Regex> = [
        r#"(?i)"c"\s*:\s*\[\s*,\s*,\s*"([^"]+)""#,
        r#"(?i)data-last-price="([^"]+)""#,
        r#"(?i)class="[^"]*YMlKec[^"]*"[^>]*>([^<]+)<"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex pattern"))
    .collect();

    static ref PE_PATTERNS: Vec<Regex> = [
        r#"(?i)P/E\s*ratio[^>]*>([^<]+)<"#,
        r#"(?i)PE[^>]*>([^<]+)<"#,
        r#"(?i)"pe_ratio"[^:]*:\s*([^,}]+)"#,
        r#"(?i)P/E[^>]*:\s*([^\s<]+)"#,
        r#"(?i)PE\s*:\s*([^\s<]+)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex pattern"))
    .collect();

    static ref EPS_PATTERNS: Vec<Regex> = [
        r#"(?i)EPS[^>]*>([^<]+)<"#,
        r#"(?i)Earnings[^>]*>([^<]+)<"#,
        r#"(?i)"eps"[^:]*:\s*([^,}]+)"#,
        r#"(?i)EPS[^>]*:\s*([^\s<]+)"#,
        r#"(?i)Earnings\s*per\s*share[^>]*:\s*([^\s<]+)"#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid regex pattern"))
    .collect();

    static ref PRICE_NOISE: Regex = Regex::new(r"[₹,\s]").expect("Invalid regex pattern");
    static ref NON_NUMERIC: Regex = Regex::new(r"[^\d.\-]").expect("Invalid regex pattern");
}

/// Parse the leading float of a string, the way a lenient HTML scraper must:
/// "24.5x" -> 24.5, "" -> None.
fn leading_float(s: &str) -> Option<f64> {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        let ok = c.is_ascii_digit() || (c == '-' && i == 0) || (c == '.' && !seen_dot);
        if !ok {
            break;
        }
        if c == '.' {
            seen_dot = true;
        }
        end = i + c.len_utf8();
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// First pattern whose capture parses and passes `accept`.
fn first_match(
    html: &str,
    patterns: &[Regex],
    clean: &Regex,
    accept: impl Fn(f64) -> bool,
) -> Option<f64> {
    patterns.iter().find_map(|pattern| {
        let captured = pattern.captures(html)?.get(1)?.as_str();
        let cleaned = clean.replace_all(captured, "");
        leading_float(&cleaned).filter(|v| accept(*v))
    })
}

/// What one quote page yielded.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ScrapedPage {
    pub price: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
}

impl ScrapedPage {
    fn is_empty(&self) -> bool {
        self.price.is_none() && self.pe_ratio.is_none() && self.eps.is_none()
    }
}

pub(crate) fn scrape(html: &str) -> ScrapedPage {
    ScrapedPage {
        price: first_match(html, &PRICE_PATTERNS, &PRICE_NOISE, |v| v > 0.0),
        pe_ratio: first_match(html, &PE_PATTERNS, &NON_NUMERIC, |v| v > 0.0 && v < MAX_PE),
        eps: first_match(html, &EPS_PATTERNS, &NON_NUMERIC, |v| v > 0.0),
    }
}

fn to_quote(symbol: &str, page: ScrapedPage, fetched_at: DateTime<Utc>) -> AdapterQuote {
    let fundamentals = Fundamentals {
        pe_ratio: page.pe_ratio.and_then(Decimal::from_f64).map(round_money),
        latest_earnings: page.eps.and_then(Decimal::from_f64).map(round_money),
        market_cap: None,
    };
    match page.price.and_then(Decimal::from_f64) {
        // The page carries no reliable previous close; change is reported flat
        Some(price) => {
            let mut quote = AdapterQuote::price(
                symbol,
                round_money(price),
                Decimal::ZERO,
                Decimal::ZERO,
                fetched_at,
            );
            quote.fundamentals = fundamentals;
            quote
        }
        None => AdapterQuote::fundamentals(symbol, fundamentals, fetched_at),
    }
}

/// Secondary-tier adapter scraping google.com/finance quote pages.
pub struct GoogleFinanceAdapter {
    client: Client,
    timeout: Duration,
}

impl GoogleFinanceAdapter {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_ADAPTER_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
            timeout,
        }
    }

    async fn fetch_page(&self, symbol: &str, path: &str) -> Result<String, MarketDataError> {
        let url = format!("{}/{}", BASE_URL, path);
        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.5")
            .header(header::DNT, "1")
            .header(header::UPGRADE_INSECURE_REQUESTS, "1")
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_ID, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(PROVIDER_ID, symbol, status));
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::parse(PROVIDER_ID, e.to_string()))
    }
}

impl Default for GoogleFinanceAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SourceAdapter for GoogleFinanceAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn tier(&self) -> Tier {
        Tier::Secondary
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::FULL
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch(&self, symbol: &str) -> Result<AdapterQuote, MarketDataError> {
        let mut fundamentals_only: Option<ScrapedPage> = None;
        let mut last_error: Option<MarketDataError> = None;

        for path in google_symbols(symbol) {
            match self.fetch_page(symbol, &path).await {
                Ok(html) => {
                    let page = scrape(&html);
                    debug!("Google Finance {}: {:?}", path, page);
                    if page.price.is_some() {
                        return Ok(to_quote(symbol, page, Utc::now()));
                    }
                    if !page.is_empty() && fundamentals_only.is_none() {
                        fundamentals_only = Some(page);
                    }
                }
                Err(e) => {
                    debug!("Google Finance {} failed: {}", path, e);
                    last_error = Some(e);
                }
            }
        }

        if let Some(page) = fundamentals_only {
            return Ok(to_quote(symbol, page, Utc::now()));
        }

        Err(last_error.unwrap_or(MarketDataError::NoUsablePrice {
            provider: PROVIDER_ID.to_string(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const QUOTE_PAGE: &str = r#"
        <div class="rPF6Lc"><div class="YMlKec fxKbKc">₹1,612.35</div></div>
        <div class="gyFHrc"><div class="mfs7Fc">P/E ratio</div><div class="P6K39c">19.84</div></div>
        <script>var data = {"eps": 81.27, "other": 1};</script>
    "#;

    #[test]
    fn test_scrape_price_strips_currency_and_commas() {
        let page = scrape(QUOTE_PAGE);
        assert_eq!(page.price, Some(1612.35));
    }

    #[test]
    fn test_data_last_price_attribute() {
        let page = scrape(r#"<div data-last-price="3580.5" data-currency-code="INR"></div>"#);
        assert_eq!(page.price, Some(3580.5));
    }

    #[test]
    fn test_json_blob_price_takes_precedence() {
        let html = r#"["c": [ , , "1500.25"] <div data-last-price="99"></div>"#;
        assert_eq!(scrape(html).price, Some(1500.25));
    }

    #[test]
    fn test_pe_rejects_out_of_range() {
        let page = scrape(r#"{"pe_ratio": 4500}"#);
        assert!(page.pe_ratio.is_none());

        let page = scrape(r#"{"pe_ratio": 22.5}"#);
        assert_eq!(page.pe_ratio, Some(22.5));
    }

    #[test]
    fn test_eps_from_json_blob() {
        let page = scrape(r#"<script>{"eps": 63.4}</script>"#);
        assert_eq!(page.eps, Some(63.4));
    }

    #[test]
    fn test_empty_page() {
        let page = scrape("<html><body>Nothing here</body></html>");
        assert!(page.is_empty());
    }

    #[test]
    fn test_to_quote_price_and_fundamentals() {
        let page = ScrapedPage {
            price: Some(1612.354),
            pe_ratio: Some(19.84),
            eps: None,
        };
        let q = to_quote("HDFCBANK", page, Utc::now());
        assert_eq!(q.price, Some(dec!(1612.35)));
        assert_eq!(q.change, Some(dec!(0)));
        assert_eq!(q.fundamentals.pe_ratio, Some(dec!(19.84)));
        assert!(q.fundamentals.latest_earnings.is_none());
    }

    #[test]
    fn test_to_quote_fundamentals_only() {
        let page = ScrapedPage {
            price: None,
            pe_ratio: None,
            eps: Some(12.0),
        };
        let q = to_quote("HDFCBANK", page, Utc::now());
        assert!(q.usable_price().is_none());
        assert_eq!(q.fundamentals.latest_earnings, Some(dec!(12)));
    }

    #[test]
    fn test_leading_float() {
        assert_eq!(leading_float("24.5x"), Some(24.5));
        assert_eq!(leading_float("-3.2"), Some(-3.2));
        assert_eq!(leading_float("1.2.3"), Some(1.2));
        assert_eq!(leading_float(""), None);
        assert_eq!(leading_float("."), None);
    }
}
