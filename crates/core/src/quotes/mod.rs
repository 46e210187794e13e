//! Quote retrieval: cache, batch orchestration and outcome classification.

pub mod cache;
pub mod model;
pub mod orchestrator;

pub use cache::ResultCache;
pub use model::{CacheKey, CachePurpose, RefreshOutcome, SourceClassification};
pub use orchestrator::{BatchOrchestrator, OrchestratorConfig};
