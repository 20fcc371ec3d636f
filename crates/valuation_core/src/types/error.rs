//! Error types for market-data operations.
//!
//! Calculations themselves never fail: blank or degenerate inputs are
//! coerced to defaults. Errors arise only when editing the GPU tables.

use thiserror::Error;

/// Errors raised when editing GPU price and hourly-rate tables.
///
/// # Examples
/// ```
/// use valuation_core::types::ValuationError;
///
/// let err = ValuationError::ProtectedGpuType("b200".to_string());
/// assert_eq!(err.to_string(), "GPU type 'b200' is a default type and cannot be removed");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValuationError {
    /// The GPU type is not present in the table.
    #[error("Unknown GPU type: {0}")]
    UnknownGpuType(String),

    /// Default GPU types cannot be removed.
    #[error("GPU type '{0}' is a default type and cannot be removed")]
    ProtectedGpuType(String),

    /// A GPU type with this key already exists.
    #[error("GPU type already exists: {0}")]
    DuplicateGpuType(String),

    /// The key is empty or contains whitespace.
    #[error("Invalid GPU key '{key}': {reason}")]
    InvalidGpuKey {
        /// The rejected key.
        key: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}
