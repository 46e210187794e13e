use std::fmt;

use serde::{Deserialize, Serialize};

/// One ranked source level in the fallback chain.
///
/// Ordering follows the chain: `Primary < Secondary < Synthetic`, so the
/// "deepest" tier of a resolution is the maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    /// Structured price feeds (Yahoo chart, Alpha Vantage, Yahoo fundamentals).
    Primary,
    /// Scraped feeds (Google Finance HTML).
    Secondary,
    /// Deterministic placeholder data.
    Synthetic,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Synthetic => "synthetic",
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which tiers (and adapters) produced a resolved quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    /// Tier of the adapter that supplied the price.
    pub price_tier: Tier,

    /// Adapter that supplied the price.
    pub price_source: String,

    /// Tier that supplied fundamentals, if any were found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamentals_tier: Option<Tier>,

    /// Adapter that supplied fundamentals, if any were found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fundamentals_source: Option<String>,

    /// True when fundamentals came from a different tier than the price.
    pub mixed: bool,
}

impl Provenance {
    pub fn new(
        price_tier: Tier,
        price_source: impl Into<String>,
        fundamentals: Option<(Tier, String)>,
    ) -> Self {
        let (fundamentals_tier, fundamentals_source) = match fundamentals {
            Some((tier, source)) => (Some(tier), Some(source)),
            None => (None, None),
        };
        Self {
            price_tier,
            price_source: price_source.into(),
            mixed: fundamentals_tier.is_some_and(|t| t != price_tier),
            fundamentals_tier,
            fundamentals_source,
        }
    }

    /// Provenance of a quote produced entirely by one adapter.
    pub fn single(tier: Tier, source: impl Into<String>) -> Self {
        let source = source.into();
        Self::new(tier, source.clone(), Some((tier, source)))
    }

    /// Short label for logs and badges: the price tier, or "mixed".
    pub fn label(&self) -> &'static str {
        if self.mixed {
            "mixed"
        } else {
            self.price_tier.as_str()
        }
    }
}
