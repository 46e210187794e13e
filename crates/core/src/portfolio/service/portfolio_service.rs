use std::sync::RwLock;
use std::time::Instant;

use async_trait::async_trait;
use log::{debug, error, info};

use folioboard_market_data::symbols::normalize;
use folioboard_market_data::{QuoteResult, SyntheticAdapter};

use super::portfolio_model::{PortfolioView, ResponseMetadata};
use super::portfolio_traits::PortfolioServiceTrait;
use crate::errors::{Error, Result};
use crate::portfolio::holdings::{parse_holdings, Holding};
use crate::portfolio::metrics;
use crate::portfolio::snapshot::PortfolioSnapshot;
use crate::quotes::{BatchOrchestrator, SourceClassification};
use crate::refresh::RefreshTarget;

/// Owns the holdings and the last published view.
///
/// Every holdings replacement bumps a generation number. A refresh pass
/// records the generation it started from and is discarded at commit time
/// if the holdings were replaced in the meantime.
pub struct PortfolioService {
    orchestrator: BatchOrchestrator,
    synthetic: SyntheticAdapter,
    published: RwLock<Published>,
}

struct Published {
    view: PortfolioView,
    generation: u64,
}

impl PortfolioService {
    /// Start from `holdings` valued at their own current prices.
    pub fn new(holdings: Vec<Holding>, orchestrator: BatchOrchestrator) -> Self {
        let count = holdings.len();
        let view = PortfolioView {
            data: PortfolioSnapshot::from_holdings(metrics::recompute(&holdings)),
            metadata: ResponseMetadata::new(SourceClassification::UserProvided, 0, count),
        };
        Self {
            orchestrator,
            synthetic: SyntheticAdapter::new(),
            published: RwLock::new(Published {
                view,
                generation: 0,
            }),
        }
    }

    pub fn orchestrator(&self) -> &BatchOrchestrator {
        &self.orchestrator
    }

    /// Symbols to refresh and the generation they belong to.
    fn begin_pass(&self) -> (Vec<String>, u64) {
        let published = self.published.read().unwrap_or_else(|e| e.into_inner());
        (published.view.data.symbols(), published.generation)
    }

    /// Apply `updates` to the current holdings and publish. A pass started
    /// before the last replacement publishes nothing and yields the current
    /// view.
    fn commit(
        &self,
        generation: u64,
        updates: &[QuoteResult],
        metadata: ResponseMetadata,
    ) -> Commit {
        let mut published = self.published.write().unwrap_or_else(|e| e.into_inner());
        if published.generation != generation {
            return Commit::Superseded(published.view.clone());
        }
        let snapshot = PortfolioSnapshot::compute(&published.view.data.holdings, updates);
        published.view = PortfolioView {
            data: snapshot,
            metadata,
        };
        Commit::Published(published.view.clone())
    }

    /// One refresh pass. The error, if any, is already reflected in the
    /// published metadata.
    async fn refresh_pass(&self, bypass_cache: bool) -> (PortfolioView, Option<Error>) {
        let started = Instant::now();
        let (symbols, generation) = self.begin_pass();

        match self.orchestrator.refresh_all(&symbols, bypass_cache).await {
            Ok(outcome) => {
                let mut metadata = ResponseMetadata::new(
                    outcome.classification,
                    elapsed_ms(started),
                    outcome.updates.len(),
                );
                metadata.missing = outcome.missing;
                metadata.cache_hits = outcome.cache_hits;
                match self.commit(generation, &outcome.updates, metadata) {
                    Commit::Published(view) => (view, None),
                    Commit::Superseded(view) => (self.discard_pass(view), None),
                }
            }
            Err(e) => {
                error!("Refresh pass aborted, publishing synthetic data: {}", e);
                let updates: Vec<QuoteResult> =
                    symbols.iter().map(|s| self.synthetic.resolve(s)).collect();
                let mut metadata = ResponseMetadata::new(
                    SourceClassification::SyntheticOnly,
                    elapsed_ms(started),
                    updates.len(),
                );
                metadata.error = Some(e.to_string());
                match self.commit(generation, &updates, metadata) {
                    Commit::Published(view) => (view, Some(e.into())),
                    Commit::Superseded(view) => (self.discard_pass(view), None),
                }
            }
        }
    }

    /// Drop what a superseded pass cached for the old symbol set.
    fn discard_pass(&self, current: PortfolioView) -> PortfolioView {
        info!("Holdings replaced during refresh, discarding pass results");
        self.orchestrator.cache().invalidate_all();
        current
    }
}

enum Commit {
    Published(PortfolioView),
    Superseded(PortfolioView),
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    fn current_view(&self) -> PortfolioView {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .view
            .clone()
    }

    async fn refresh(&self, bypass_cache: bool) -> PortfolioView {
        self.refresh_pass(bypass_cache).await.0
    }

    fn replace_holdings(&self, body: &serde_json::Value) -> Result<PortfolioView> {
        let started = Instant::now();
        let holdings = parse_holdings(body)?;
        let count = holdings.len();

        let snapshot = PortfolioSnapshot::from_holdings(metrics::recompute(&holdings));
        let view = PortfolioView {
            data: snapshot,
            metadata: ResponseMetadata::new(
                SourceClassification::UserProvided,
                elapsed_ms(started),
                count,
            ),
        };

        {
            let mut published = self.published.write().unwrap_or_else(|e| e.into_inner());
            published.view = view.clone();
            published.generation += 1;
        }
        self.orchestrator.cache().invalidate_all();
        info!("Replaced holdings with {} user-provided rows", count);
        Ok(view)
    }

    async fn quote(&self, symbol: &str, bypass_cache: bool) -> Result<QuoteResult> {
        let symbol = normalize(symbol);
        if symbol.is_empty() {
            return Err(Error::invalid_input("Symbol must not be empty"));
        }
        debug!("Resolving single quote for {}", symbol);
        Ok(self.orchestrator.resolve_one(&symbol, bypass_cache).await?)
    }

    fn sweep_cache(&self) -> usize {
        self.orchestrator.cache().sweep()
    }
}

#[async_trait]
impl RefreshTarget for PortfolioService {
    async fn run_refresh(&self, bypass_cache: bool) -> Result<SourceClassification> {
        let (view, error) = self.refresh_pass(bypass_cache).await;
        match error {
            Some(e) => Err(e),
            None => Ok(view.metadata.provenance),
        }
    }
}
