//! Error types and fallback classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum for every adapter and resolver operation
//! - [`RetryClass`]: Classification for determining fallback behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching market data.
///
/// Adapter-level variants are the "adapter failures" of the pipeline: the
/// fallback resolver recovers from them locally by moving to the next tier.
/// Each variant is classified into a [`RetryClass`] via
/// [`retry_class`](Self::retry_class).
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The upstream does not know the symbol.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The upstream rate limited the request (HTTP 429 or an API note).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The adapter that was rate limited
        provider: String,
    },

    /// The request did not complete within the adapter's timeout.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The adapter that timed out
        provider: String,
    },

    /// An adapter-specific failure (bad status, unexpected payload).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The adapter that returned the error
        provider: String,
        /// The error message
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("Parse error: {provider} - {message}")]
    ParseError {
        /// The adapter whose response failed to parse
        provider: String,
        /// Description of the mismatch
        message: String,
    },

    /// The adapter answered but had neither a usable price nor fundamentals.
    #[error("No usable price from {provider}")]
    NoUsablePrice {
        /// The adapter that returned nothing usable
        provider: String,
    },

    /// The adapter does not implement the requested operation.
    #[error("Operation '{operation}' not supported by {provider}")]
    NotSupported {
        /// The unsupported operation
        operation: String,
        /// The adapter
        provider: String,
    },

    /// Every tier, including the synthetic generator, failed for the symbol.
    #[error("Symbol unresolvable: {0}")]
    SymbolUnresolvable(String),

    /// A transport error occurred while communicating with an upstream.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the fallback classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use folioboard_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "YAHOO_CHART".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::NextTierWithPenalty);
    ///
    /// let error = MarketDataError::SymbolUnresolvable("INVALID".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::SymbolUnresolvable(_) => RetryClass::Never,

            Self::RateLimited { .. } | Self::Timeout { .. } => RetryClass::NextTierWithPenalty,

            Self::SymbolNotFound(_)
            | Self::ProviderError { .. }
            | Self::ParseError { .. }
            | Self::NoUsablePrice { .. }
            | Self::NotSupported { .. }
            | Self::Network(_) => RetryClass::NextTier,
        }
    }

    /// Convenience constructor for adapter-specific failures.
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Convenience constructor for payload shape mismatches.
    pub fn parse(provider: &str, message: impl Into<String>) -> Self {
        Self::ParseError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
