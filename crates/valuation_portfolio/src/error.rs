//! Portfolio error types.
//!
//! This module provides structured error types for portfolio state updates
//! using `thiserror` for derivation.

use thiserror::Error;
use valuation_core::types::ValuationError;
use valuation_models::SiteType;

/// Errors that can occur when updating a portfolio.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PortfolioError {
    /// Site not found in portfolio.
    #[error("Site not found: {0}")]
    SiteNotFound(String),

    /// A site with this ID already exists.
    #[error("Duplicate site ID: {0}")]
    DuplicateSite(String),

    /// Neither a preset nor a saved custom scenario has this ID.
    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    /// A parameter record of another site type was supplied.
    #[error("Site type mismatch for {id}: expected {expected}, got {actual}")]
    SiteTypeMismatch {
        /// Site being updated.
        id: String,
        /// The site's fixed type.
        expected: SiteType,
        /// Type of the rejected record.
        actual: SiteType,
    },

    /// GPU table edit rejected.
    #[error(transparent)]
    Market(#[from] ValuationError),
}
