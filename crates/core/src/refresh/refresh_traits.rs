use async_trait::async_trait;

use crate::errors::Result;
use crate::quotes::SourceClassification;

/// Something the scheduler can refresh.
#[async_trait]
pub trait RefreshTarget: Send + Sync {
    /// Run one refresh pass and report the classification of the data it
    /// published. An error means the pass fell back to degraded data.
    async fn run_refresh(&self, bypass_cache: bool) -> Result<SourceClassification>;
}
