use chrono::{DateTime, Utc};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::provenance::{Provenance, Tier};

/// Decimal places kept on every monetary value.
pub const MONEY_DP: u32 = 2;

/// Round a monetary value to [`MONEY_DP`] places, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert an upstream float into a Decimal, rejecting NaN and infinities.
pub fn finite_decimal(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64(value)
    } else {
        None
    }
}

/// Valuation fundamentals. Every field is optional because adapters differ
/// in what they can populate.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pe_ratio: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_earnings: Option<Decimal>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<Decimal>,
}

impl Fundamentals {
    pub fn is_empty(&self) -> bool {
        self.pe_ratio.is_none() && self.latest_earnings.is_none() && self.market_cap.is_none()
    }

    /// True when P/E or earnings are present. Market cap alone does not count
    /// as fundamentals for provenance purposes.
    pub fn has_valuation(&self) -> bool {
        self.pe_ratio.is_some() || self.latest_earnings.is_some()
    }

    /// True when both P/E and earnings are known.
    pub fn is_complete(&self) -> bool {
        self.pe_ratio.is_some() && self.latest_earnings.is_some()
    }

    /// Fill fields that are still missing from `other`.
    pub fn fill_missing(&mut self, other: &Fundamentals) {
        if self.pe_ratio.is_none() {
            self.pe_ratio = other.pe_ratio;
        }
        if self.latest_earnings.is_none() {
            self.latest_earnings = other.latest_earnings;
        }
        if self.market_cap.is_none() {
            self.market_cap = other.market_cap;
        }
    }
}

/// The raw answer of a single adapter for a single symbol.
///
/// An adapter may answer with price only, fundamentals only, or both.
#[derive(Clone, Debug, PartialEq)]
pub struct AdapterQuote {
    pub symbol: String,
    pub price: Option<Decimal>,
    pub change: Option<Decimal>,
    pub change_percent: Option<Decimal>,
    pub fundamentals: Fundamentals,
    pub fetched_at: DateTime<Utc>,
}

impl AdapterQuote {
    /// Create a price quote with no fundamentals.
    pub fn price(
        symbol: &str,
        price: Decimal,
        change: Decimal,
        change_percent: Decimal,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            price: Some(price),
            change: Some(change),
            change_percent: Some(change_percent),
            fundamentals: Fundamentals::default(),
            fetched_at,
        }
    }

    /// Create a fundamentals-only answer.
    pub fn fundamentals(
        symbol: &str,
        fundamentals: Fundamentals,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            price: None,
            change: None,
            change_percent: None,
            fundamentals,
            fetched_at,
        }
    }

    /// The price, if it is usable (strictly positive).
    pub fn usable_price(&self) -> Option<Decimal> {
        self.price.filter(|p| *p > Decimal::ZERO)
    }
}

/// A resolved quote for one symbol, with its provenance.
///
/// Ephemeral: consumed by the metrics engine right after a refresh pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    pub symbol: String,
    pub price: Decimal,
    pub change: Decimal,
    /// Day change as a fraction (0.012 = +1.2%).
    pub change_percent: Decimal,
    #[serde(flatten)]
    pub fundamentals: Fundamentals,
    pub provenance: Provenance,
    pub fetched_at: DateTime<Utc>,
}

impl QuoteResult {
    /// True when the price came from a real upstream.
    pub fn is_live(&self) -> bool {
        !self.provenance.price_tier.is_synthetic()
    }

    pub fn price_tier(&self) -> Tier {
        self.provenance.price_tier
    }
}
