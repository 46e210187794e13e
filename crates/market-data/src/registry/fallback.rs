//! Tiered fallback resolution for a single symbol.

use std::borrow::Cow;
use std::sync::Arc;

use log::{debug, info, warn};

use super::{RequestSpacer, ResolutionDiagnostics, SkipReason};
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{AdapterQuote, Fundamentals, Provenance, QuoteResult, Tier};
use crate::provider::SourceAdapter;

/// Resolves one symbol by walking the adapter chain tier by tier.
///
/// Rules:
/// 1. Adapters are ordered by tier (Primary, Secondary, Synthetic), then by
///    priority within a tier.
/// 2. A tier is entered only while no usable price has been found.
/// 3. Inside an entered tier, price adapters are called while the price is
///    missing and fundamentals adapters while fundamentals are incomplete.
/// 4. Fundamentals are taken from whichever called adapter supplies them
///    first, regardless of which tier supplied the price.
/// 5. Every call is bounded by the adapter's timeout and spaced by its
///    request spacing.
pub struct FallbackResolver {
    adapters: Vec<Arc<dyn SourceAdapter>>,
    spacer: RequestSpacer,
}

/// The price half of a resolution in progress.
struct PriceHit {
    quote: AdapterQuote,
    tier: Tier,
    source: &'static str,
}

impl FallbackResolver {
    pub fn new(mut adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        adapters.sort_by_key(|a| (a.tier(), a.priority()));
        Self {
            adapters,
            spacer: RequestSpacer::new(),
        }
    }

    /// Registered adapters in chain order.
    pub fn adapters(&self) -> &[Arc<dyn SourceAdapter>] {
        &self.adapters
    }

    /// Resolve a symbol to a quote with provenance.
    ///
    /// Returns [`MarketDataError::SymbolUnresolvable`] when no adapter in any
    /// tier produced a usable price.
    pub async fn resolve(&self, symbol: &str) -> Result<QuoteResult, MarketDataError> {
        let (result, diagnostics) = self.resolve_with_diagnostics(symbol).await;
        debug!("Resolution for '{}': {}", symbol, diagnostics.summary());
        result
    }

    /// Like [`resolve`](Self::resolve), also returning every attempt made.
    pub async fn resolve_with_diagnostics(
        &self,
        symbol: &str,
    ) -> (Result<QuoteResult, MarketDataError>, ResolutionDiagnostics) {
        let mut diagnostics = ResolutionDiagnostics::new();
        let mut price: Option<PriceHit> = None;
        let mut fundamentals = Fundamentals::default();
        let mut fundamentals_source: Option<(Tier, String)> = None;

        let mut current_tier: Option<Tier> = None;
        for adapter in &self.adapters {
            let tier = adapter.tier();
            if current_tier != Some(tier) {
                if price.is_some() {
                    break;
                }
                current_tier = Some(tier);
            }

            let id = adapter.id();
            let caps = adapter.capabilities();
            let wants_price = caps.supplies_price && price.is_none();
            let wants_fundamentals = caps.supplies_fundamentals && !fundamentals.is_complete();

            if !wants_price && !wants_fundamentals {
                let reason = if caps.supplies_price {
                    SkipReason::PriceResolved
                } else {
                    SkipReason::FundamentalsResolved
                };
                diagnostics.record_skip(Cow::Borrowed(id), tier, reason);
                continue;
            }

            match self.call(adapter.as_ref(), symbol).await {
                Ok(quote) => {
                    let mut contributed = false;

                    if wants_fundamentals && !quote.fundamentals.is_empty() {
                        fundamentals.fill_missing(&quote.fundamentals);
                        if fundamentals_source.is_none() && quote.fundamentals.has_valuation() {
                            fundamentals_source = Some((tier, id.to_string()));
                        }
                        contributed = true;
                    }

                    if wants_price && quote.usable_price().is_some() {
                        // Price adapters may carry market cap alongside the price
                        if !wants_fundamentals && fundamentals.market_cap.is_none() {
                            fundamentals.market_cap = quote.fundamentals.market_cap;
                        }
                        price = Some(PriceHit {
                            quote,
                            tier,
                            source: id,
                        });
                        contributed = true;
                    }

                    if contributed {
                        diagnostics.record_success(Cow::Borrowed(id), tier);
                    } else {
                        diagnostics.record_error(
                            Cow::Borrowed(id),
                            tier,
                            MarketDataError::NoUsablePrice {
                                provider: id.to_string(),
                            }
                            .to_string(),
                        );
                    }
                }
                Err(e) => {
                    match e.retry_class() {
                        RetryClass::Never => {
                            info!("Terminal error from '{}' for '{}': {}", id, symbol, e);
                            diagnostics.record_error(Cow::Borrowed(id), tier, e.to_string());
                            return (Err(e), diagnostics);
                        }
                        RetryClass::NextTierWithPenalty => {
                            self.spacer.penalize(id, adapter.request_spacing());
                            warn!("Adapter '{}' pushed back for '{}': {}", id, symbol, e);
                        }
                        RetryClass::NextTier => {
                            debug!("Adapter '{}' failed for '{}': {}", id, symbol, e);
                        }
                    }
                    diagnostics.record_error(Cow::Borrowed(id), tier, e.to_string());
                }
            }
        }

        let Some(hit) = price else {
            warn!(
                "No tier produced a price for '{}': {}",
                symbol,
                diagnostics.summary()
            );
            return (
                Err(MarketDataError::SymbolUnresolvable(symbol.to_string())),
                diagnostics,
            );
        };

        if hit.tier.is_synthetic() {
            info!("Using synthetic data for '{}'", symbol);
        }

        let result = build_result(symbol, hit, fundamentals, fundamentals_source);
        (Ok(result), diagnostics)
    }

    /// One bounded, spaced adapter call.
    async fn call(
        &self,
        adapter: &dyn SourceAdapter,
        symbol: &str,
    ) -> Result<AdapterQuote, MarketDataError> {
        self.spacer
            .acquire(adapter.id(), adapter.request_spacing())
            .await;

        match tokio::time::timeout(adapter.timeout(), adapter.fetch(symbol)).await {
            Ok(result) => result,
            Err(_) => Err(MarketDataError::Timeout {
                provider: adapter.id().to_string(),
            }),
        }
    }
}

fn build_result(
    symbol: &str,
    hit: PriceHit,
    fundamentals: Fundamentals,
    fundamentals_source: Option<(Tier, String)>,
) -> QuoteResult {
    let quote = hit.quote;
    QuoteResult {
        symbol: symbol.to_string(),
        price: quote.price.unwrap_or_default(),
        change: quote.change.unwrap_or_default(),
        change_percent: quote.change_percent.unwrap_or_default(),
        fundamentals,
        provenance: Provenance::new(hit.tier, hit.source, fundamentals_source),
        fetched_at: quote.fetched_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{AdapterCapabilities, SyntheticAdapter};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Behavior {
        Price(Decimal),
        Fundamentals(Decimal, Decimal),
        Full(Decimal, Decimal),
        Fail,
        RateLimited,
        Hang,
    }

    struct MockAdapter {
        id: &'static str,
        tier: Tier,
        priority: u8,
        caps: AdapterCapabilities,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl MockAdapter {
        fn new(
            id: &'static str,
            tier: Tier,
            priority: u8,
            caps: AdapterCapabilities,
            behavior: Behavior,
        ) -> Arc<Self> {
            Arc::new(Self {
                id,
                tier,
                priority,
                caps,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SourceAdapter for MockAdapter {
        fn id(&self) -> &'static str {
            self.id
        }

        fn tier(&self) -> Tier {
            self.tier
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        fn capabilities(&self) -> AdapterCapabilities {
            self.caps
        }

        fn timeout(&self) -> Duration {
            Duration::from_millis(50)
        }

        async fn fetch(&self, symbol: &str) -> Result<AdapterQuote, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = Utc::now();
            match &self.behavior {
                Behavior::Price(p) => Ok(AdapterQuote::price(symbol, *p, dec!(1), dec!(0.01), now)),
                Behavior::Fundamentals(pe, eps) => Ok(AdapterQuote::fundamentals(
                    symbol,
                    Fundamentals {
                        pe_ratio: Some(*pe),
                        latest_earnings: Some(*eps),
                        market_cap: None,
                    },
                    now,
                )),
                Behavior::Full(p, pe) => {
                    let mut q = AdapterQuote::price(symbol, *p, dec!(0), dec!(0), now);
                    q.fundamentals.pe_ratio = Some(*pe);
                    Ok(q)
                }
                Behavior::Fail => Err(MarketDataError::provider(self.id, "HTTP 500")),
                Behavior::RateLimited => Err(MarketDataError::RateLimited {
                    provider: self.id.to_string(),
                }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(MarketDataError::provider(self.id, "unreachable"))
                }
            }
        }
    }

    fn as_dyn(adapters: &[Arc<MockAdapter>]) -> Vec<Arc<dyn SourceAdapter>> {
        adapters
            .iter()
            .map(|a| a.clone() as Arc<dyn SourceAdapter>)
            .collect()
    }

    #[tokio::test]
    async fn test_primary_price_stops_descent() {
        let primary = MockAdapter::new(
            "P",
            Tier::Primary,
            1,
            AdapterCapabilities::PRICE_ONLY,
            Behavior::Price(dec!(120)),
        );
        let secondary = MockAdapter::new(
            "S",
            Tier::Secondary,
            1,
            AdapterCapabilities::FULL,
            Behavior::Full(dec!(99), dec!(10)),
        );
        let resolver = FallbackResolver::new(as_dyn(&[primary.clone(), secondary.clone()]));

        let quote = resolver.resolve("X").await.unwrap();
        assert_eq!(quote.price, dec!(120));
        assert_eq!(quote.provenance.price_tier, Tier::Primary);
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_primary_fails_secondary_succeeds() {
        let primary = MockAdapter::new(
            "P",
            Tier::Primary,
            1,
            AdapterCapabilities::PRICE_ONLY,
            Behavior::Fail,
        );
        let secondary = MockAdapter::new(
            "S",
            Tier::Secondary,
            1,
            AdapterCapabilities::FULL,
            Behavior::Full(dec!(99), dec!(10)),
        );
        let resolver = FallbackResolver::new(as_dyn(&[secondary.clone(), primary.clone()]));

        let (result, diagnostics) = resolver.resolve_with_diagnostics("X").await;
        let quote = result.unwrap();
        assert_eq!(quote.price, dec!(99));
        assert_eq!(quote.provenance.price_tier, Tier::Secondary);
        assert_eq!(quote.provenance.price_source, "S");
        assert!(!quote.provenance.mixed);
        assert_eq!(diagnostics.called(), vec!["P", "S"]);
    }

    #[tokio::test]
    async fn test_mixed_when_fundamentals_from_primary() {
        let chart = MockAdapter::new(
            "CHART",
            Tier::Primary,
            1,
            AdapterCapabilities::PRICE_ONLY,
            Behavior::Fail,
        );
        let funds = MockAdapter::new(
            "FUNDS",
            Tier::Primary,
            5,
            AdapterCapabilities::FUNDAMENTALS_ONLY,
            Behavior::Fundamentals(dec!(22), dec!(61)),
        );
        let google = MockAdapter::new(
            "GOOGLE",
            Tier::Secondary,
            1,
            AdapterCapabilities::FULL,
            Behavior::Full(dec!(1500), dec!(30)),
        );
        let resolver = FallbackResolver::new(as_dyn(&[chart, funds, google.clone()]));

        let quote = resolver.resolve("X").await.unwrap();
        assert_eq!(quote.price, dec!(1500));
        // Fundamentals were complete before the secondary tier was reached
        assert_eq!(quote.fundamentals.pe_ratio, Some(dec!(22)));
        assert_eq!(quote.fundamentals.latest_earnings, Some(dec!(61)));
        assert_eq!(quote.provenance.fundamentals_tier, Some(Tier::Primary));
        assert_eq!(quote.provenance.price_tier, Tier::Secondary);
        assert!(quote.provenance.mixed);
        assert_eq!(google.calls(), 1);
    }

    #[tokio::test]
    async fn test_fundamentals_adapter_called_alongside_price() {
        let chart = MockAdapter::new(
            "CHART",
            Tier::Primary,
            1,
            AdapterCapabilities::PRICE_ONLY,
            Behavior::Price(dec!(50)),
        );
        let funds = MockAdapter::new(
            "FUNDS",
            Tier::Primary,
            5,
            AdapterCapabilities::FUNDAMENTALS_ONLY,
            Behavior::Fundamentals(dec!(18), dec!(3)),
        );
        let resolver = FallbackResolver::new(as_dyn(&[funds.clone(), chart.clone()]));

        let quote = resolver.resolve("X").await.unwrap();
        assert_eq!(quote.price, dec!(50));
        assert_eq!(quote.fundamentals.pe_ratio, Some(dec!(18)));
        assert!(!quote.provenance.mixed);
        assert_eq!(chart.calls(), 1);
        assert_eq!(funds.calls(), 1);
    }

    #[tokio::test]
    async fn test_second_price_adapter_skipped_once_price_found() {
        let first = MockAdapter::new(
            "FIRST",
            Tier::Primary,
            1,
            AdapterCapabilities::PRICE_ONLY,
            Behavior::Price(dec!(50)),
        );
        let second = MockAdapter::new(
            "SECOND",
            Tier::Primary,
            2,
            AdapterCapabilities::PRICE_ONLY,
            Behavior::Price(dec!(51)),
        );
        let resolver = FallbackResolver::new(as_dyn(&[second.clone(), first.clone()]));

        let (result, diagnostics) = resolver.resolve_with_diagnostics("X").await;
        assert_eq!(result.unwrap().price, dec!(50));
        assert_eq!(second.calls(), 0);
        assert_eq!(diagnostics.attempts[1].skipped, Some(SkipReason::PriceResolved));
    }

    #[tokio::test]
    async fn test_all_fail_is_unresolvable() {
        let primary = MockAdapter::new(
            "P",
            Tier::Primary,
            1,
            AdapterCapabilities::PRICE_ONLY,
            Behavior::Fail,
        );
        let secondary = MockAdapter::new(
            "S",
            Tier::Secondary,
            1,
            AdapterCapabilities::FULL,
            Behavior::RateLimited,
        );
        let resolver = FallbackResolver::new(as_dyn(&[primary, secondary]));

        let err = resolver.resolve("X").await.unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolUnresolvable(s) if s == "X"));
    }

    #[tokio::test]
    async fn test_zero_price_is_not_usable() {
        let primary = MockAdapter::new(
            "P",
            Tier::Primary,
            1,
            AdapterCapabilities::PRICE_ONLY,
            Behavior::Price(dec!(0)),
        );
        let synthetic: Arc<dyn SourceAdapter> = Arc::new(SyntheticAdapter::new());
        let mut adapters = as_dyn(&[primary]);
        adapters.push(synthetic);
        let resolver = FallbackResolver::new(adapters);

        let quote = resolver.resolve("TCS").await.unwrap();
        assert_eq!(quote.provenance.price_tier, Tier::Synthetic);
        assert_eq!(quote.price, dec!(992.4));
        assert!(!quote.is_live());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_adapter_times_out() {
        let slow = MockAdapter::new(
            "SLOW",
            Tier::Primary,
            1,
            AdapterCapabilities::PRICE_ONLY,
            Behavior::Hang,
        );
        let backup = MockAdapter::new(
            "BACKUP",
            Tier::Secondary,
            1,
            AdapterCapabilities::FULL,
            Behavior::Full(dec!(10), dec!(5)),
        );
        let resolver = FallbackResolver::new(as_dyn(&[slow, backup]));

        let (result, diagnostics) = resolver.resolve_with_diagnostics("X").await;
        assert_eq!(result.unwrap().price, dec!(10));
        assert_eq!(diagnostics.errors()[0].1, "Timeout: SLOW");
    }

    #[tokio::test]
    async fn test_synthetic_fallback_is_deterministic() {
        let failing = MockAdapter::new(
            "P",
            Tier::Primary,
            1,
            AdapterCapabilities::PRICE_ONLY,
            Behavior::Fail,
        );
        let mut adapters = as_dyn(&[failing]);
        adapters.push(Arc::new(SyntheticAdapter::new()));
        let resolver = FallbackResolver::new(adapters);

        let a = resolver.resolve("INFY").await.unwrap();
        let b = resolver.resolve("INFY").await.unwrap();
        assert_eq!(a.price, b.price);
        assert_eq!(a.fundamentals, b.fundamentals);
        assert_eq!(a.provenance, b.provenance);
        assert_eq!(a.provenance.label(), "synthetic");
    }
}
