//! Deterministic placeholder data.
//!
//! The last tier of the chain. Every value is derived from a 32-bit hash of
//! the symbol, so repeated failures show the same numbers instead of noise.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::models::{round_money, AdapterQuote, Fundamentals, Provenance, QuoteResult, Tier};
use crate::provider::{AdapterCapabilities, SourceAdapter};

const PROVIDER_ID: &str = "SYNTHETIC";

/// Wrapping 32-bit string hash: `h = (h << 5) - h + unit` over UTF-16 units.
pub fn symbol_hash(symbol: &str) -> i32 {
    symbol
        .encode_utf16()
        .fold(0i32, |h, unit| (h << 5).wrapping_sub(h).wrapping_add(unit as i32))
}

/// Every value the generator derives for one symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticValues {
    pub price: Decimal,
    pub change: Decimal,
    /// Fraction of the base price.
    pub change_percent: Decimal,
    pub pe_ratio: Decimal,
    pub latest_earnings: Decimal,
    pub volume: Decimal,
    pub market_cap: Decimal,
}

impl SyntheticValues {
    pub fn for_symbol(symbol: &str) -> Self {
        let h = i64::from(symbol_hash(symbol));
        let abs = h.abs();

        let base = Decimal::from((h % 1000).abs() + 100);
        let variation = Decimal::new(abs % 100, 1);
        let change = if h % 2 == 0 { variation } else { -variation };
        let price = base + change;
        let volume = Decimal::from((h % 100_000).abs() + 10_000);

        Self {
            price,
            change,
            change_percent: change / base,
            pe_ratio: Decimal::from(15 + abs % 40),
            latest_earnings: Decimal::from(50 + abs % 200),
            volume,
            market_cap: price * volume,
        }
    }
}

/// The synthetic tier. Never fails.
#[derive(Default)]
pub struct SyntheticAdapter;

impl SyntheticAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous form of [`SourceAdapter::fetch`].
    pub fn quote(&self, symbol: &str) -> AdapterQuote {
        let v = SyntheticValues::for_symbol(symbol);
        let mut quote = AdapterQuote::price(
            symbol,
            round_money(v.price),
            round_money(v.change),
            v.change_percent,
            Utc::now(),
        );
        quote.fundamentals = Fundamentals {
            pe_ratio: Some(v.pe_ratio),
            latest_earnings: Some(v.latest_earnings),
            market_cap: Some(round_money(v.market_cap)),
        };
        quote
    }

    /// A resolved quote tagged as synthetic, for passes that skip the
    /// fallback chain entirely.
    pub fn resolve(&self, symbol: &str) -> QuoteResult {
        let quote = self.quote(symbol);
        QuoteResult {
            symbol: quote.symbol,
            price: quote.price.unwrap_or_default(),
            change: quote.change.unwrap_or_default(),
            change_percent: quote.change_percent.unwrap_or_default(),
            fundamentals: quote.fundamentals,
            provenance: Provenance::single(Tier::Synthetic, PROVIDER_ID),
            fetched_at: quote.fetched_at,
        }
    }
}

#[async_trait]
impl SourceAdapter for SyntheticAdapter {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn tier(&self) -> Tier {
        Tier::Synthetic
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::FULL
    }

    async fn fetch(&self, symbol: &str) -> Result<AdapterQuote, MarketDataError> {
        Ok(self.quote(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_hash_matches_known_values() {
        assert_eq!(symbol_hash(""), 0);
        assert_eq!(symbol_hash("A"), 65);
        // 65 * 31 + 66
        assert_eq!(symbol_hash("AB"), 2081);
        assert_eq!(symbol_hash("TCS"), 82_884);
        assert_eq!(symbol_hash("HDFCBANK"), -1_078_018_955);
    }

    #[test]
    fn test_hash_wraps_on_long_symbols() {
        // Long inputs overflow i32 without panicking
        let h = symbol_hash("BAJFINANCEBAJFINANCEBAJFINANCE");
        assert_eq!(h, symbol_hash("BAJFINANCEBAJFINANCEBAJFINANCE"));
    }

    #[test]
    fn test_values_for_tcs() {
        // h = 82884: even, |h % 1000| = 884, |h| % 100 = 84
        let v = SyntheticValues::for_symbol("TCS");
        assert_eq!(v.change, dec!(8.4));
        assert_eq!(v.price, dec!(992.4));
        assert_eq!(v.pe_ratio, dec!(19));
        assert_eq!(v.latest_earnings, dec!(134));
        assert_eq!(v.volume, dec!(92884));
        assert_eq!(v.change_percent, dec!(8.4) / dec!(984));
    }

    #[test]
    fn test_negative_hash_uses_magnitudes() {
        // h = -1078018955: odd, |h % 1000| = 955, |h| % 100 = 55
        let v = SyntheticValues::for_symbol("HDFCBANK");
        assert_eq!(v.price, dec!(1049.5));
        assert_eq!(v.change, dec!(-5.5));
        assert_eq!(v.pe_ratio, dec!(50));
        assert_eq!(v.latest_earnings, dec!(205));
        assert_eq!(v.volume, dec!(28955));
    }

    #[test]
    fn test_deterministic() {
        let a = SyntheticAdapter::new().quote("HDFCBANK");
        let b = SyntheticAdapter::new().quote("HDFCBANK");
        assert_eq!(a.price, b.price);
        assert_eq!(a.change, b.change);
        assert_eq!(a.fundamentals, b.fundamentals);
    }

    #[test]
    fn test_price_always_usable() {
        for symbol in ["HDFCBANK", "BAJFINANCE", "ICICIBANK", "AFFLE", "INFY", "TCS", "", "Z"] {
            let q = SyntheticAdapter::new().quote(symbol);
            assert!(q.usable_price().is_some(), "{}", symbol);
        }
    }

    #[test]
    fn test_resolve_is_tagged_synthetic() {
        let q = SyntheticAdapter::new().resolve("TCS");
        assert_eq!(q.price, dec!(992.4));
        assert!(!q.is_live());
        assert_eq!(q.provenance.fundamentals_tier, Some(Tier::Synthetic));
        assert!(!q.provenance.mixed);
    }

    #[tokio::test]
    async fn test_fetch_never_fails() {
        let adapter = SyntheticAdapter::new();
        let q = adapter.fetch("NOT_A_REAL_CODE").await.unwrap();
        assert!(q.fundamentals.has_valuation());
        assert_eq!(adapter.tier(), Tier::Synthetic);
    }
}
