//! Source adapter trait definitions.
//!
//! This module defines the `SourceAdapter` trait that every upstream price
//! or fundamentals source implements.

use std::time::Duration;

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{AdapterQuote, Tier};

use super::capabilities::{AdapterCapabilities, DEFAULT_ADAPTER_TIMEOUT};

/// Trait for market data source adapters.
///
/// Implement this trait to add a new upstream. The fallback resolver uses the
/// adapter's tier, priority and capabilities to decide when to call it.
///
/// Implementations must never panic on upstream data: every transport, status
/// or parse problem is returned as a [`MarketDataError`] naming the adapter.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use folioboard_market_data::models::{AdapterQuote, Tier};
/// use folioboard_market_data::provider::{AdapterCapabilities, SourceAdapter};
///
/// struct MyFeed;
///
/// #[async_trait]
/// impl SourceAdapter for MyFeed {
///     fn id(&self) -> &'static str {
///         "MY_FEED"
///     }
///
///     fn tier(&self) -> Tier {
///         Tier::Primary
///     }
///
///     fn capabilities(&self) -> AdapterCapabilities {
///         AdapterCapabilities::PRICE_ONLY
///     }
///
///     // ... implement fetch
/// }
/// ```
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Unique identifier for this adapter.
    ///
    /// Should be a constant string like "YAHOO_CHART", "GOOGLE_FINANCE".
    /// Used for logging, diagnostics, request spacing and provenance.
    fn id(&self) -> &'static str;

    /// Tier of the fallback chain this adapter belongs to.
    fn tier(&self) -> Tier;

    /// Ordering within a tier.
    ///
    /// Lower values = higher priority. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    /// Which fields this adapter can populate.
    fn capabilities(&self) -> AdapterCapabilities;

    /// Upper bound on one [`fetch`](Self::fetch) call, enforced by the resolver.
    fn timeout(&self) -> Duration {
        DEFAULT_ADAPTER_TIMEOUT
    }

    /// Minimum delay between two calls to this adapter.
    ///
    /// Default is zero (no spacing).
    fn request_spacing(&self) -> Duration {
        Duration::ZERO
    }

    /// Fetch the latest data for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The exchange code as held in the portfolio (e.g. "HDFCBANK").
    ///   Adapters map it to their own notation.
    async fn fetch(&self, symbol: &str) -> Result<AdapterQuote, MarketDataError>;
}
