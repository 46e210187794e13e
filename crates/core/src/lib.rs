//! Folioboard Core - portfolio valuation and the refresh pipeline.
//!
//! Holds the holdings, sector and summary models, the metrics engine, the
//! quote cache and batch orchestrator, the refresh scheduler and the
//! preferences store. Quote sourcing itself lives in
//! `folioboard-market-data`.

pub mod constants;
pub mod errors;
pub mod portfolio;
pub mod quotes;
pub mod refresh;
pub mod settings;
pub mod utils;

pub use portfolio::*;
pub use quotes::{BatchOrchestrator, OrchestratorConfig, ResultCache, SourceClassification};
pub use refresh::{RefreshScheduler, RefreshState, RefreshTarget, StalenessPolicy};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
