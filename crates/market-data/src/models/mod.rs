//! Market data models
//!
//! This module contains the core data types exchanged between adapters and
//! the fallback resolver:
//! - `types` - Type aliases for common identifiers (AdapterId, Symbol)
//! - `provenance` - Source tiers and the provenance tag carried by every quote
//! - `quote` - Raw adapter answers (AdapterQuote) and resolved quotes (QuoteResult)

mod provenance;
mod quote;
mod types;

pub use provenance::{Provenance, Tier};
pub use quote::{finite_decimal, round_money, AdapterQuote, Fundamentals, QuoteResult};
pub use types::{AdapterId, Symbol};
