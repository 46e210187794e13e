//! Per-resolution attempt tracking.

use crate::models::{AdapterId, Tier};

/// Why an adapter was not called during a resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// A price was already resolved and the adapter supplies nothing else
    /// that is still missing.
    PriceResolved,

    /// Fundamentals were already complete and the adapter only supplies
    /// fundamentals.
    FundamentalsResolved,
}

/// Record of a single adapter attempt during a resolution.
#[derive(Clone, Debug)]
pub struct AdapterAttempt {
    pub adapter_id: AdapterId,
    pub tier: Tier,
    pub skipped: Option<SkipReason>,
    pub error: Option<String>,
    pub success: bool,
}

/// Every attempt made while resolving one symbol, in call order.
#[derive(Clone, Debug, Default)]
pub struct ResolutionDiagnostics {
    pub attempts: Vec<AdapterAttempt>,
}

impl ResolutionDiagnostics {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    pub fn record_skip(&mut self, adapter_id: AdapterId, tier: Tier, reason: SkipReason) {
        self.attempts.push(AdapterAttempt {
            adapter_id,
            tier,
            skipped: Some(reason),
            error: None,
            success: false,
        });
    }

    pub fn record_error(&mut self, adapter_id: AdapterId, tier: Tier, error: String) {
        self.attempts.push(AdapterAttempt {
            adapter_id,
            tier,
            skipped: None,
            error: Some(error),
            success: false,
        });
    }

    pub fn record_success(&mut self, adapter_id: AdapterId, tier: Tier) {
        self.attempts.push(AdapterAttempt {
            adapter_id,
            tier,
            skipped: None,
            error: None,
            success: true,
        });
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|a| {
                if a.success {
                    format!("{}: SUCCESS", a.adapter_id)
                } else if let Some(skip) = &a.skipped {
                    format!("{}: SKIPPED ({:?})", a.adapter_id, skip)
                } else if let Some(err) = &a.error {
                    format!("{}: ERROR ({})", a.adapter_id, err)
                } else {
                    format!("{}: UNKNOWN", a.adapter_id)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn has_success(&self) -> bool {
        self.attempts.iter().any(|a| a.success)
    }

    /// Ids of the adapters that were actually called, skips excluded.
    pub fn called(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter(|a| a.skipped.is_none())
            .map(|a| a.adapter_id.as_ref())
            .collect()
    }

    pub fn errors(&self) -> Vec<(&AdapterId, &str)> {
        self.attempts
            .iter()
            .filter_map(|a| a.error.as_ref().map(|e| (&a.adapter_id, e.as_str())))
            .collect()
    }
}
