use async_trait::async_trait;

use folioboard_market_data::QuoteResult;

use super::portfolio_model::PortfolioView;
use crate::errors::Result;

#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    /// The last published view.
    fn current_view(&self) -> PortfolioView;

    /// Refresh prices for every holding and publish the result. Never fails:
    /// an aborted pass publishes synthetic data with `metadata.error` set.
    async fn refresh(&self, bypass_cache: bool) -> PortfolioView;

    /// Replace the holdings with a user-supplied JSON array.
    fn replace_holdings(&self, body: &serde_json::Value) -> Result<PortfolioView>;

    /// Resolve a single symbol.
    async fn quote(&self, symbol: &str, bypass_cache: bool) -> Result<QuoteResult>;

    /// Drop expired cache entries, returning how many were removed.
    fn sweep_cache(&self) -> usize;
}
