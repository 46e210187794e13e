use std::fmt;

use serde::{Deserialize, Serialize};

use folioboard_market_data::QuoteResult;

/// Quality of the data behind a published portfolio view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceClassification {
    /// Every symbol priced from a real source.
    Full,
    /// Some symbols missing or synthetic.
    Partial,
    /// Nothing came from a real source.
    SyntheticOnly,
    /// Values supplied by the user.
    UserProvided,
}

impl SourceClassification {
    /// Classify a refresh pass over `requested` symbols.
    ///
    /// `live` counts symbols priced by a non-synthetic tier. An empty request
    /// is `Full`.
    pub fn classify(requested: usize, live: usize) -> Self {
        if requested == 0 || live >= requested {
            Self::Full
        } else if live == 0 {
            Self::SyntheticOnly
        } else {
            Self::Partial
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::SyntheticOnly => "synthetic-only",
            Self::UserProvided => "user-provided",
        }
    }

    /// Indicator shown next to the figures.
    pub fn badge(&self) -> &'static str {
        match self {
            Self::Full | Self::UserProvided => "live",
            Self::Partial => "mixed",
            Self::SyntheticOnly => "demo",
        }
    }
}

impl fmt::Display for SourceClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a cached value was resolved for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CachePurpose {
    Quote,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub purpose: CachePurpose,
}

impl CacheKey {
    pub fn quote(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            purpose: CachePurpose::Quote,
        }
    }
}

/// Result of one orchestrated refresh pass.
#[derive(Clone, Debug)]
pub struct RefreshOutcome {
    /// One entry per symbol that resolved, in request order.
    pub updates: Vec<QuoteResult>,
    pub classification: SourceClassification,
    /// Symbols no tier could price.
    pub missing: Vec<String>,
    /// Symbols served from the cache.
    pub cache_hits: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(SourceClassification::classify(0, 0), SourceClassification::Full);
        assert_eq!(SourceClassification::classify(5, 5), SourceClassification::Full);
        assert_eq!(SourceClassification::classify(5, 4), SourceClassification::Partial);
        assert_eq!(
            SourceClassification::classify(3, 0),
            SourceClassification::SyntheticOnly
        );
    }

    #[test]
    fn test_badges() {
        assert_eq!(SourceClassification::Full.badge(), "live");
        assert_eq!(SourceClassification::UserProvided.badge(), "live");
        assert_eq!(SourceClassification::Partial.badge(), "mixed");
        assert_eq!(SourceClassification::SyntheticOnly.badge(), "demo");
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&SourceClassification::SyntheticOnly).unwrap();
        assert_eq!(json, "\"synthetic-only\"");
        let json = serde_json::to_string(&SourceClassification::UserProvided).unwrap();
        assert_eq!(json, "\"user-provided\"");
    }
}
