//! Core error types for the Folioboard application.
//!
//! Adapter failures never reach this layer: the fallback resolver absorbs
//! them. What remains are input validation problems, preference file I/O and
//! orchestration failures.

use thiserror::Error;

pub use folioboard_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the core crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Refresh pipeline failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Failed to access preferences: {0}")]
    Preferences(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for user input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

/// Failures that abort a whole refresh pass.
///
/// Individual symbol failures are not errors at this level; they only show
/// up in the outcome classification.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A resolution task panicked or was cancelled.
    #[error("Batch {batch} failed: {message}")]
    Batch { batch: usize, message: String },
}

impl Error {
    /// Shorthand for an invalid-input validation error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::Validation(ValidationError::InvalidInput(message.into()))
    }

    /// True for errors caused by the caller's input.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }
}

// === From implementations for common error types ===

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Preferences(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
