//! Yahoo Finance API response models.
//!
//! Two endpoints are used: the v8 chart endpoint for prices and the v10
//! quoteSummary endpoint for valuation fundamentals. Every field is optional;
//! Yahoo omits or nulls fields freely.

use serde::Deserialize;

// ============================================================================
// Chart (v8)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct YahooChartResponse {
    pub chart: YahooChart,
}

#[derive(Debug, Deserialize)]
pub struct YahooChart {
    pub result: Option<Vec<YahooChartResult>>,
    pub error: Option<YahooApiError>,
}

#[derive(Debug, Deserialize)]
pub struct YahooApiError {
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YahooChartResult {
    pub meta: Option<YahooChartMeta>,
    pub indicators: Option<YahooIndicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooChartMeta {
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub chart_previous_close: Option<f64>,
    pub regular_market_previous_close: Option<f64>,
    pub market_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct YahooIndicators {
    pub quote: Option<Vec<YahooIndicatorQuote>>,
}

/// One OHLCV series; null entries mark intervals without trades.
#[derive(Debug, Deserialize)]
pub struct YahooIndicatorQuote {
    pub close: Option<Vec<Option<f64>>>,
}

// ============================================================================
// quoteSummary (v10)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResponse {
    pub quote_summary: YahooQuoteSummary,
}

#[derive(Debug, Deserialize)]
pub struct YahooQuoteSummary {
    pub result: Option<Vec<YahooQuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteSummaryResult {
    pub default_key_statistics: Option<YahooKeyStatistics>,
    pub financial_data: Option<YahooFinancialData>,
    pub earnings_history: Option<YahooEarningsHistory>,
}

/// Yahoo returns numbers as `{"raw": 123.45, "fmt": "123.45"}`, or `{}` when
/// the value is unknown.
#[derive(Debug, Deserialize, Clone)]
pub struct YahooRawValue {
    pub raw: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooKeyStatistics {
    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<YahooRawValue>,
    #[serde(rename = "forwardPE")]
    pub forward_pe: Option<YahooRawValue>,
    pub trailing_eps: Option<YahooRawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooFinancialData {
    pub trailing_eps: Option<YahooRawValue>,
}

#[derive(Debug, Deserialize)]
pub struct YahooEarningsHistory {
    pub history: Option<Vec<YahooEarningsEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooEarningsEntry {
    pub eps_actual: Option<YahooRawValue>,
}

/// Extract the raw float of an optional `{raw, fmt}` field.
pub fn raw(value: &Option<YahooRawValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw)
}
