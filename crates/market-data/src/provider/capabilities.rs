//! Adapter capabilities.
//!
//! This module defines structures for describing what a source adapter can
//! populate.

use std::time::Duration;

/// Default per-call timeout for an adapter request.
///
/// Also used as the transport timeout of the adapters' HTTP clients.
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(8);

/// Describes which fields an adapter can populate.
///
/// The fallback resolver composes adapters rather than requiring one of them
/// to be authoritative for everything: price adapters are consulted while the
/// price is missing, fundamentals adapters while fundamentals are missing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdapterCapabilities {
    /// Whether the adapter can supply a price.
    pub supplies_price: bool,

    /// Whether the adapter can supply P/E and earnings.
    pub supplies_fundamentals: bool,
}

impl AdapterCapabilities {
    pub const PRICE_ONLY: Self = Self {
        supplies_price: true,
        supplies_fundamentals: false,
    };

    pub const FUNDAMENTALS_ONLY: Self = Self {
        supplies_price: false,
        supplies_fundamentals: true,
    };

    pub const FULL: Self = Self {
        supplies_price: true,
        supplies_fundamentals: true,
    };
}
