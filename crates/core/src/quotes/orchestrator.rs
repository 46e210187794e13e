//! Fans a symbol list out to the fallback resolver in bounded batches.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, info, warn};

use folioboard_market_data::{FallbackResolver, MarketDataError, QuoteResult};

use super::cache::ResultCache;
use super::model::{CacheKey, RefreshOutcome, SourceClassification};
use crate::constants::{DEFAULT_BATCH_SIZE, DEFAULT_CACHE_TTL, DEFAULT_INTER_BATCH_DELAY};
use crate::errors::PipelineError;

#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    pub batch_size: usize,
    pub inter_batch_delay: Duration,
    pub cache_ttl: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay: DEFAULT_INTER_BATCH_DELAY,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

pub struct BatchOrchestrator {
    resolver: Arc<FallbackResolver>,
    cache: Arc<ResultCache>,
    config: OrchestratorConfig,
}

enum Slot {
    Cached(QuoteResult),
    Fetched(Result<QuoteResult, MarketDataError>),
}

impl BatchOrchestrator {
    pub fn new(
        resolver: Arc<FallbackResolver>,
        cache: Arc<ResultCache>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            resolver,
            cache,
            config,
        }
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Resolve every symbol and classify the pass.
    ///
    /// Symbols are deduplicated keeping first-seen order. Batches run in
    /// sequence with a pause in between; symbols inside a batch resolve
    /// concurrently. A symbol that no tier can price is reported in
    /// `missing` and does not stop the run.
    pub async fn refresh_all(
        &self,
        symbols: &[String],
        bypass_cache: bool,
    ) -> Result<RefreshOutcome, PipelineError> {
        let symbols = dedupe(symbols);
        let batch_size = self.config.batch_size.max(1);
        let batch_count = symbols.len().div_ceil(batch_size);

        info!(
            "Refreshing {} symbols in {} batches (bypass_cache={})",
            symbols.len(),
            batch_count,
            bypass_cache
        );

        let mut updates = Vec::with_capacity(symbols.len());
        let mut missing = Vec::new();
        let mut cache_hits = 0;

        for (index, batch) in symbols.chunks(batch_size).enumerate() {
            if index > 0 && !self.config.inter_batch_delay.is_zero() {
                tokio::time::sleep(self.config.inter_batch_delay).await;
            }

            let slots = self.run_batch(index + 1, batch, bypass_cache).await?;
            for (symbol, slot) in batch.iter().zip(slots) {
                match slot {
                    Slot::Cached(quote) => {
                        cache_hits += 1;
                        updates.push(quote);
                    }
                    Slot::Fetched(Ok(quote)) => {
                        if quote.is_live() {
                            self.cache.put(
                                CacheKey::quote(symbol.clone()),
                                quote.clone(),
                                self.config.cache_ttl,
                            );
                        }
                        updates.push(quote);
                    }
                    Slot::Fetched(Err(e)) => {
                        warn!("No price for {}: {}", symbol, e);
                        missing.push(symbol.clone());
                    }
                }
            }
        }

        let live = updates.iter().filter(|q| q.is_live()).count();
        let classification = SourceClassification::classify(symbols.len(), live);

        info!(
            "Refresh pass done: {} updated ({} live, {} cached), {} missing, classification {}",
            updates.len(),
            live,
            cache_hits,
            missing.len(),
            classification
        );

        Ok(RefreshOutcome {
            updates,
            classification,
            missing,
            cache_hits,
        })
    }

    /// Resolve a single symbol through the cache and the fallback chain.
    pub async fn resolve_one(
        &self,
        symbol: &str,
        bypass_cache: bool,
    ) -> Result<QuoteResult, MarketDataError> {
        let key = CacheKey::quote(symbol);
        if !bypass_cache {
            if let Some(quote) = self.cache.get(&key) {
                debug!("Cache hit for {}", symbol);
                return Ok(quote);
            }
        }

        let quote = self.resolver.resolve(symbol).await?;
        if quote.is_live() {
            self.cache.put(key, quote.clone(), self.config.cache_ttl);
        }
        Ok(quote)
    }

    async fn run_batch(
        &self,
        batch_number: usize,
        batch: &[String],
        bypass_cache: bool,
    ) -> Result<Vec<Slot>, PipelineError> {
        let mut slots: Vec<Option<Slot>> = Vec::with_capacity(batch.len());
        let mut pending = Vec::new();

        for (position, symbol) in batch.iter().enumerate() {
            let cached = if bypass_cache {
                None
            } else {
                self.cache.get(&CacheKey::quote(symbol.clone()))
            };

            match cached {
                Some(quote) => {
                    debug!("Cache hit for {}", symbol);
                    slots.push(Some(Slot::Cached(quote)));
                }
                None => {
                    let resolver = self.resolver.clone();
                    let symbol = symbol.clone();
                    pending.push((
                        position,
                        tokio::spawn(async move { resolver.resolve(&symbol).await }),
                    ));
                    slots.push(None);
                }
            }
        }

        let (positions, handles): (Vec<usize>, Vec<_>) = pending.into_iter().unzip();
        for (position, joined) in positions.into_iter().zip(join_all(handles).await) {
            let result = joined.map_err(|e| PipelineError::Batch {
                batch: batch_number,
                message: e.to_string(),
            })?;
            slots[position] = Some(Slot::Fetched(result));
        }

        slots
            .into_iter()
            .map(|slot| {
                slot.ok_or_else(|| PipelineError::Batch {
                    batch: batch_number,
                    message: "symbol left unresolved".to_string(),
                })
            })
            .collect()
    }
}

fn dedupe(symbols: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .iter()
        .filter(|s| seen.insert(s.as_str()))
        .cloned()
        .collect()
}
