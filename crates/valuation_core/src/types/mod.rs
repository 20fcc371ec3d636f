//! Core types shared across the valuation workspace.
//!
//! This module provides:
//! - [`input`]: Blank-tolerant numeric inputs and lenient deserialisation
//! - [`ids`]: Site and scenario identifiers
//! - [`error`]: Market-data error types

pub mod error;
pub mod ids;
pub mod input;

pub use error::ValuationError;
pub use ids::{ScenarioId, SiteId};
pub use input::{Coerce, LenientTag};
