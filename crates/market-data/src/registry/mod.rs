//! Adapter orchestration for one symbol.
//!
//! This module provides:
//! - Tier-ordered fallback resolution with provenance
//! - Request spacing per adapter
//! - Attempt diagnostics for logging

mod diagnostics;
mod fallback;
mod spacer;

pub use diagnostics::{AdapterAttempt, ResolutionDiagnostics, SkipReason};
pub use fallback::FallbackResolver;
pub use spacer::RequestSpacer;
