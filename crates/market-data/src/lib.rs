//! Folioboard Market Data Crate
//!
//! Fetches prices and valuation fundamentals for portfolio symbols from a
//! chain of unreliable upstreams, degrading tier by tier down to
//! deterministic synthetic data.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! | FallbackResolver |  (one symbol, tier by tier)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |  RequestSpacer   | --> |  SourceAdapter   |  (Yahoo, Alpha Vantage, Google, synthetic)
//! +------------------+     +------------------+
//!                                   |
//!                                   v
//!                          +------------------+
//!                          |   AdapterQuote   |  (raw answer of one adapter)
//!                          +------------------+
//!                                   |
//!                                   v
//!                          +------------------+
//!                          |   QuoteResult    |  (merged quote + provenance)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`SourceAdapter`] - One upstream price or fundamentals source
//! - [`FallbackResolver`] - Tiered resolution for a single symbol
//! - [`QuoteResult`] - Resolved quote with [`Provenance`]
//! - [`Tier`] - Rank of a source in the fallback chain

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod symbols;

pub use errors::{MarketDataError, RetryClass};

pub use models::{
    finite_decimal, round_money, AdapterId, AdapterQuote, Fundamentals, Provenance, QuoteResult,
    Symbol, Tier,
};

pub use provider::{
    build_adapters, AdapterCapabilities, AdapterSettings, AlphaVantageAdapter,
    GoogleFinanceAdapter, SourceAdapter, SyntheticAdapter, SyntheticValues, YahooChartAdapter,
    YahooFundamentalsAdapter, DEFAULT_ADAPTER_TIMEOUT,
};

pub use registry::{
    AdapterAttempt, FallbackResolver, RequestSpacer, ResolutionDiagnostics, SkipReason,
};
