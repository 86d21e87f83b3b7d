// =============================================================================
// Error types for the analysis core
// =============================================================================
//
// Insufficient history is never an error: rolling computations mark those
// rows as undefined (`None`).  Errors are reserved for bad input data and
// invalid parameters.

use thiserror::Error;

/// The unified error type for the `strategy_lab` library.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// The loader could not produce data (unknown symbol, unreadable file,
    /// empty date range, missing quote).
    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Bar timestamps are not strictly increasing.
    #[error("bars for {symbol} are not strictly increasing at index {index}")]
    UnorderedSeries { symbol: String, index: usize },

    /// A window, span, threshold or multiplier is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl AnalysisError {
    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}
