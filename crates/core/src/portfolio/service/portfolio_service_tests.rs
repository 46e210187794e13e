use super::*;
use crate::errors::MarketDataError;
use crate::portfolio::holdings::Holding;
use crate::quotes::{BatchOrchestrator, OrchestratorConfig, ResultCache, SourceClassification};
use crate::refresh::RefreshTarget;
use crate::utils::ManualClock;
use async_trait::async_trait;
use chrono::Utc;
use folioboard_market_data::{
    AdapterCapabilities, AdapterQuote, FallbackResolver, SourceAdapter, Tier,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Implementations
// ============================================================================

struct PricedAdapter {
    prices: HashMap<&'static str, Decimal>,
    panic_on: Option<&'static str>,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl PricedAdapter {
    fn new(prices: &[(&'static str, Decimal)]) -> Self {
        Self {
            prices: prices.iter().cloned().collect(),
            panic_on: None,
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SourceAdapter for PricedAdapter {
    fn id(&self) -> &'static str {
        "PRICED"
    }

    fn tier(&self) -> Tier {
        Tier::Primary
    }

    fn capabilities(&self) -> AdapterCapabilities {
        AdapterCapabilities::PRICE_ONLY
    }

    async fn fetch(&self, symbol: &str) -> std::result::Result<AdapterQuote, MarketDataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on.is_some_and(|p| p == symbol) {
            panic!("resolution task failure");
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match self.prices.get(symbol) {
            Some(price) => Ok(AdapterQuote::price(
                symbol,
                *price,
                Decimal::ZERO,
                Decimal::ZERO,
                Utc::now(),
            )),
            None => Err(MarketDataError::SymbolNotFound(symbol.to_string())),
        }
    }
}

fn holding(id: &str, symbol: &str, sector: &str, purchase: Decimal, qty: Decimal) -> Holding {
    let mut h = Holding::new(symbol, symbol, sector, purchase, qty);
    h.id = id.to_string();
    h
}

fn service(adapter: Arc<PricedAdapter>, holdings: Vec<Holding>) -> PortfolioService {
    let clock = Arc::new(ManualClock::default());
    let orchestrator = BatchOrchestrator::new(
        Arc::new(FallbackResolver::new(vec![adapter])),
        Arc::new(ResultCache::new(clock)),
        OrchestratorConfig {
            batch_size: 5,
            inter_batch_delay: Duration::ZERO,
            cache_ttl: Duration::from_secs(300),
        },
    );
    PortfolioService::new(holdings, orchestrator)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_initial_view_is_valued_at_purchase() {
    let svc = service(
        Arc::new(PricedAdapter::new(&[])),
        vec![holding("1", "X", "Technology", dec!(100), dec!(10))],
    );
    let view = svc.current_view();
    assert_eq!(view.data.holdings[0].present_value, dec!(1000));
    assert_eq!(view.data.holdings[0].portfolio_weight, dec!(1));
    assert_eq!(view.metadata.provenance, SourceClassification::UserProvided);
}

#[tokio::test]
async fn test_refresh_applies_updates() {
    let adapter = Arc::new(PricedAdapter::new(&[("X", dec!(120))]));
    let svc = service(adapter, vec![holding("1", "X", "Technology", dec!(100), dec!(10))]);

    let view = svc.refresh(false).await;
    let h = &view.data.holdings[0];
    assert_eq!(h.present_value, dec!(1200));
    assert_eq!(h.gain_loss, dec!(200));
    assert_eq!(h.gain_loss_percent, dec!(0.2));
    assert_eq!(view.metadata.provenance, SourceClassification::Full);
    assert_eq!(view.metadata.badge, "live");
    assert_eq!(view.metadata.updates_count, 1);
    assert_eq!(svc.current_view(), view);
}

#[tokio::test]
async fn test_unresolved_holding_keeps_previous_price() {
    let adapter = Arc::new(PricedAdapter::new(&[
        ("A", dec!(11)),
        ("B", dec!(22)),
        ("D", dec!(44)),
        ("E", dec!(55)),
    ]));
    let holdings = vec![
        holding("1", "A", "Financial", dec!(10), dec!(1)),
        holding("2", "B", "Financial", dec!(20), dec!(1)),
        holding("3", "C", "Technology", dec!(30), dec!(1)),
        holding("4", "D", "Technology", dec!(40), dec!(1)),
        holding("5", "E", "Energy", dec!(50), dec!(1)),
    ];
    let svc = service(adapter, holdings);

    let view = svc.refresh(false).await;
    assert_eq!(view.metadata.provenance, SourceClassification::Partial);
    assert_eq!(view.metadata.badge, "mixed");
    assert_eq!(view.metadata.missing, vec!["C".to_string()]);
    assert_eq!(view.data.holdings[2].current_price, dec!(30));
    assert_eq!(view.data.holdings[0].current_price, dec!(11));
}

#[tokio::test]
async fn test_aborted_pass_publishes_synthetic_data() {
    let mut adapter = PricedAdapter::new(&[("A", dec!(11))]);
    adapter.panic_on = Some("TCS");
    let svc = service(
        Arc::new(adapter),
        vec![
            holding("1", "A", "Financial", dec!(10), dec!(1)),
            holding("2", "TCS", "Technology", dec!(3500), dec!(1)),
        ],
    );

    let err = svc.run_refresh(false).await.unwrap_err();
    assert!(err.to_string().contains("Batch 1 failed"));

    let view = svc.current_view();
    assert_eq!(view.metadata.provenance, SourceClassification::SyntheticOnly);
    assert_eq!(view.metadata.badge, "demo");
    assert!(view.metadata.error.is_some());
    // hash("TCS") = 82884 -> 884 + 100 + 8.4
    assert_eq!(view.data.holdings[1].current_price, dec!(992.4));
}

#[tokio::test]
async fn test_replace_holdings_invalidates_cache() {
    let adapter = Arc::new(PricedAdapter::new(&[("X", dec!(120)), ("Y", dec!(5))]));
    let svc = service(adapter.clone(), vec![holding("1", "X", "Technology", dec!(100), dec!(10))]);

    svc.refresh(false).await;
    assert_eq!(svc.orchestrator().cache().len(), 1);

    let view = svc
        .replace_holdings(&json!([
            { "id": "a", "symbol": "Y", "purchasePrice": 4, "quantity": 50, "currentPrice": 5, "sector": "Energy" }
        ]))
        .unwrap();

    assert!(svc.orchestrator().cache().is_empty());
    assert_eq!(view.metadata.provenance, SourceClassification::UserProvided);
    assert_eq!(view.metadata.badge, "live");
    assert_eq!(view.data.holdings[0].present_value, dec!(250));
    assert_eq!(view.data.holdings[0].gain_loss, dec!(50));
    assert_eq!(view.data.summary.count, 1);
    assert_eq!(view.data.sectors[0].sector, "Energy");
}

#[tokio::test]
async fn test_replace_holdings_rejects_invalid_body() {
    let svc = service(
        Arc::new(PricedAdapter::new(&[])),
        vec![holding("1", "X", "Technology", dec!(100), dec!(10))],
    );
    let before = svc.current_view();

    let err = svc.replace_holdings(&json!({ "not": "an array" })).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(svc.current_view(), before);
}

#[tokio::test]
async fn test_quote_normalizes_symbol() {
    let adapter = Arc::new(PricedAdapter::new(&[("INFY", dec!(1500))]));
    let svc = service(adapter.clone(), vec![]);

    let quote = svc.quote("  infy ", false).await.unwrap();
    assert_eq!(quote.symbol, "INFY");
    assert_eq!(quote.price, dec!(1500));

    svc.quote("INFY", false).await.unwrap();
    assert_eq!(adapter.calls.load(Ordering::SeqCst), 1);

    let err = svc.quote("  ", false).await.unwrap_err();
    assert!(err.is_validation());

    let err = svc.quote("UNKNOWN", false).await.unwrap_err();
    assert!(!err.is_validation());
}

#[tokio::test]
async fn test_run_refresh_reports_classification() {
    let adapter = Arc::new(PricedAdapter::new(&[("X", dec!(120))]));
    let svc = service(adapter, vec![holding("1", "X", "Technology", dec!(100), dec!(10))]);
    assert_eq!(svc.run_refresh(true).await.unwrap(), SourceClassification::Full);
}

#[tokio::test]
async fn test_replacement_during_refresh_discards_pass() {
    let gate = Arc::new(Notify::new());
    let mut adapter = PricedAdapter::new(&[("X", dec!(120)), ("Y", dec!(9))]);
    adapter.gate = Some(gate.clone());
    let adapter = Arc::new(adapter);
    let svc = Arc::new(service(
        adapter.clone(),
        vec![holding("1", "X", "Technology", dec!(100), dec!(10))],
    ));

    let pass = {
        let svc = svc.clone();
        tokio::spawn(async move { svc.run_refresh(false).await })
    };
    while adapter.calls.load(Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    svc.replace_holdings(&json!([
        { "id": "a", "symbol": "Y", "purchasePrice": 4, "quantity": 50, "currentPrice": 5 }
    ]))
    .unwrap();
    gate.notify_one();

    let classification = pass.await.unwrap().unwrap();
    assert_eq!(classification, SourceClassification::UserProvided);

    let view = svc.current_view();
    assert_eq!(view.metadata.provenance, SourceClassification::UserProvided);
    assert_eq!(view.data.holdings.len(), 1);
    assert_eq!(view.data.holdings[0].symbol, "Y");
    assert_eq!(view.data.holdings[0].current_price, dec!(5));
    assert!(svc.orchestrator().cache().is_empty());

    // The next pass runs against the replacement
    gate.notify_one();
    let view = svc.refresh(false).await;
    assert_eq!(view.metadata.provenance, SourceClassification::Full);
    assert_eq!(view.data.holdings[0].current_price, dec!(9));
}
